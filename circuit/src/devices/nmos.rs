use crate::{AtomicDevice, Component, Netlist, Node, SimulatedDevice};
use indexmap::IndexMap;
use std::rc::Rc;

/// Series resistance stamped drain-source before the first step has produced a gate voltage to
/// react to.
const INITIAL_RESISTANCE_OHMS: f64 = 10e6;
/// Drain-source resistance once the gate is driven above [`GATE_THRESHOLD_VOLTS`].
const ON_RESISTANCE_OHMS: f64 = 5.3;
/// Drain-source resistance while the gate sits at or below threshold.
const OFF_RESISTANCE_OHMS: f64 = 200e3;
/// Gate-source capacitance, stamped every step regardless of switching state.
const GATE_SOURCE_CAPACITANCE_F: f64 = 50e-12;
/// The V_gs above which the channel is considered "on".
const GATE_THRESHOLD_VOLTS: f64 = 3.0;

/// A crude, deterministic behavioral model of an n-channel MOSFET (2N7000-like), switched purely
/// on gate-source voltage from the previous step.
pub struct NTypeMosfet {
    role: String,
    gate: Rc<Node>,
    drain: Rc<Node>,
    source: Rc<Node>,
}

impl NTypeMosfet {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            gate: Node::new("gate"),
            drain: Node::new("drain"),
            source: Node::new("source"),
        }
    }

    pub fn port_gate(&self) -> &Rc<Node> {
        &self.gate
    }
    pub fn port_drain(&self) -> &Rc<Node> {
        &self.drain
    }
    pub fn port_source(&self) -> &Rc<Node> {
        &self.source
    }
}

impl Component for NTypeMosfet {
    fn component_name(&self) -> &'static str {
        "nmos"
    }
    fn role(&self) -> &str {
        &self.role
    }
    fn ports(&self) -> IndexMap<String, Rc<Node>> {
        let mut m = IndexMap::new();
        m.insert("gate".to_string(), self.gate.clone());
        m.insert("drain".to_string(), self.drain.clone());
        m.insert("source".to_string(), self.source.clone());
        m
    }
    fn sub_components(&self) -> IndexMap<String, &dyn Component> {
        IndexMap::new()
    }
    fn as_atomic(&self) -> Option<&dyn AtomicDevice> {
        Some(self)
    }
}

impl AtomicDevice for NTypeMosfet {
    fn ngspice_line(&self, id: usize, port_mapping: &IndexMap<String, String>) -> String {
        format!(
            "X{id} {} {} {} 2N7000",
            port_mapping["drain"], port_mapping["gate"], port_mapping["source"]
        )
    }

    fn make_sim_device(&self, netlist: &Netlist) -> Box<dyn SimulatedDevice> {
        Box::new(SimulatedMosfet {
            gate: netlist.group_id(&self.gate),
            drain: netlist.group_id(&self.drain),
            source: netlist.group_id(&self.source),
        })
    }
}

struct SimulatedMosfet {
    gate: usize,
    drain: usize,
    source: usize,
}

impl SimulatedDevice for SimulatedMosfet {
    fn step(&mut self, device_id: usize, ctx: &crate::StepContext, eq: &mut crate::EquationSystem) {
        if ctx.is_first_step() {
            crate::stamp_resistor(eq, self.drain, self.source, INITIAL_RESISTANCE_OHMS);
        } else {
            let v_gs = ctx.prev_voltage(self.gate) - ctx.prev_voltage(self.source);
            let r = if v_gs > GATE_THRESHOLD_VOLTS {
                ON_RESISTANCE_OHMS
            } else {
                OFF_RESISTANCE_OHMS
            };
            crate::stamp_resistor(eq, self.drain, self.source, r);
        }

        let v_prev = ctx.prev_voltage_across(self.gate, self.source);
        crate::stamp_capacitor(
            eq,
            self.gate,
            self.source,
            GATE_SOURCE_CAPACITANCE_F,
            ctx.dt,
            &format!("mosfet{device_id}cgs"),
            v_prev,
        );
    }
}
