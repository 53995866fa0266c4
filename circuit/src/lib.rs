//! Hierarchical circuit description and modified-nodal-analysis transient simulator.
//!
//! A circuit is built as a tree of [`Component`]s: composites own named sub-components and expose
//! named [`Node`] ports; leaves are atomic devices ([`devices::Resistor`], [`devices::Capacitor`],
//! [`devices::NTypeMosfet`], [`devices::AbsVoltageSource`], ...) that additionally know how to
//! emit an external-simulator netlist line and bind themselves into a stepping [`SimulatedDevice`].
//!
//! Flattening a component tree into [`Netlist`] resolves every reachable node and coalesces the
//! ones wired together into dense-numbered groups; [`Simulation`] then steps an [`EquationSystem`]
//! forward in time, letting each device stamp its contribution every step. [`tester`] drives this
//! from scripted Boolean waveforms and asserts logic-level outputs; [`spice`] offers the same
//! entry point backed by an external ngspice process instead.
//!
//! The `#[derive(Component)]` macro (re-exported from `component-derive`) generates
//! `Component::ports`/`sub_components`/`role` from struct field attributes; see its crate docs for
//! the attribute vocabulary.

pub use indexmap;

mod component;
mod config;
mod equation;
mod error;
mod netlist;
mod node;
mod simulator;
pub mod spice;
pub mod tester;

pub mod devices;

pub use component::{AtomicDevice, Component};
pub use config::SimConfig;
pub use equation::{EquationSystem, Solution};
pub use error::CircuitError;
pub use netlist::Netlist;
pub use node::Node;
pub use simulator::{
    stamp_abs_voltage, stamp_capacitor, stamp_current_source, stamp_resistor, stamp_voltage_source,
    PiecewiseLinearInput, PreStepHook, Simulation, SimulatedDevice, StepContext,
};
