//! Logic gates and latches built from [`circuit`]'s NMOS-logic devices.
//!
//! Outside of this crate, raw transistors and resistors are basically not used, and everything is
//! built from these gates: every gate here bottoms out in `circuit::devices::NTypeMosfet` and
//! `circuit::devices::PullUpResistor`, so testing one means building a netlist and stepping a
//! [`circuit::Simulation`] to a settled voltage rather than propagating an instantaneous logic
//! value.
#![deny(missing_docs)]

mod and_gate;
mod buffer_gate;
mod d_latch;
mod defaults;
mod nand_gate;
mod nor_gate;
mod not_gate;
mod or_gate;
/// Named test objects for every gate and latch, for use outside this crate's own test builds.
pub mod registry;
mod sr_latch;
mod tri_state_buffer_gate;
mod xnor_gate;
mod xor_gate;

#[cfg(test)]
mod test_support;

pub use and_gate::AndGate;
pub use buffer_gate::BufferGate;
pub use d_latch::DLatch;
pub use nand_gate::NandGate;
pub use nor_gate::NorGate;
pub use not_gate::NotGate;
pub use or_gate::OrGate;
pub use sr_latch::SrLatch;
pub use tri_state_buffer_gate::TriStateBufferGate;
pub use xnor_gate::XnorGate;
pub use xor_gate::XorGate;
