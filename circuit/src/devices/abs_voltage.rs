use crate::{AtomicDevice, Component, Netlist, Node, SimulatedDevice};
use indexmap::IndexMap;
use std::rc::Rc;

/// A single-terminal ideal voltage source against implicit ground. A `Ground` is just one held at
/// `0 V`; a `Vdd` rail is one held at the supply voltage — both are this same parameterized
/// device.
pub struct AbsVoltageSource {
    role: String,
    a: Rc<Node>,
    voltage: f64,
}

impl AbsVoltageSource {
    pub fn new(role: impl Into<String>, voltage: f64) -> Self {
        Self {
            role: role.into(),
            a: Node::new("a"),
            voltage,
        }
    }

    /// A 0 V source, equivalent to the original model's `Ground`.
    pub fn ground(role: impl Into<String>) -> Self {
        Self::new(role, 0.0)
    }

    pub fn port_a(&self) -> &Rc<Node> {
        &self.a
    }
}

impl Component for AbsVoltageSource {
    fn component_name(&self) -> &'static str {
        "abs_voltage_source"
    }
    fn role(&self) -> &str {
        &self.role
    }
    fn ports(&self) -> IndexMap<String, Rc<Node>> {
        let mut m = IndexMap::new();
        m.insert("a".to_string(), self.a.clone());
        m
    }
    fn sub_components(&self) -> IndexMap<String, &dyn Component> {
        IndexMap::new()
    }
    fn as_atomic(&self) -> Option<&dyn AtomicDevice> {
        Some(self)
    }
}

impl AtomicDevice for AbsVoltageSource {
    fn ngspice_line(&self, id: usize, port_mapping: &IndexMap<String, String>) -> String {
        format!("V{id} {} gnd {}", port_mapping["a"], self.voltage)
    }

    fn make_sim_device(&self, netlist: &Netlist) -> Box<dyn SimulatedDevice> {
        Box::new(SimulatedAbsVoltage {
            a: netlist.group_id(&self.a),
            voltage: self.voltage,
        })
    }
}

struct SimulatedAbsVoltage {
    a: usize,
    voltage: f64,
}

impl SimulatedDevice for SimulatedAbsVoltage {
    fn step(&mut self, device_id: usize, _ctx: &crate::StepContext, eq: &mut crate::EquationSystem) {
        crate::stamp_abs_voltage(eq, self.a, self.voltage, &format!("absv{device_id}"));
    }
}
