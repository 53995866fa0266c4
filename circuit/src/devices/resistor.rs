use crate::{AtomicDevice, Component, Netlist, Node, SimulatedDevice};
use indexmap::IndexMap;
use std::rc::Rc;

/// A two-terminal linear resistor.
pub struct Resistor {
    role: String,
    a: Rc<Node>,
    b: Rc<Node>,
    resistance: f64,
}

impl Resistor {
    pub fn new(role: impl Into<String>, resistance: f64) -> Self {
        Self {
            role: role.into(),
            a: Node::new("a"),
            b: Node::new("b"),
            resistance,
        }
    }

    pub fn port_a(&self) -> &Rc<Node> {
        &self.a
    }

    pub fn port_b(&self) -> &Rc<Node> {
        &self.b
    }
}

impl Component for Resistor {
    fn component_name(&self) -> &'static str {
        "resistor"
    }
    fn role(&self) -> &str {
        &self.role
    }
    fn ports(&self) -> IndexMap<String, Rc<Node>> {
        let mut m = IndexMap::new();
        m.insert("a".to_string(), self.a.clone());
        m.insert("b".to_string(), self.b.clone());
        m
    }
    fn sub_components(&self) -> IndexMap<String, &dyn Component> {
        IndexMap::new()
    }
    fn as_atomic(&self) -> Option<&dyn AtomicDevice> {
        Some(self)
    }
}

impl AtomicDevice for Resistor {
    fn ngspice_line(&self, id: usize, port_mapping: &IndexMap<String, String>) -> String {
        format!(
            "R{id} {} {} {}",
            port_mapping["a"], port_mapping["b"], self.resistance
        )
    }

    fn make_sim_device(&self, netlist: &Netlist) -> Box<dyn SimulatedDevice> {
        Box::new(SimulatedResistor {
            a: netlist.group_id(&self.a),
            b: netlist.group_id(&self.b),
            resistance: self.resistance,
        })
    }
}

struct SimulatedResistor {
    a: usize,
    b: usize,
    resistance: f64,
}

impl SimulatedDevice for SimulatedResistor {
    fn step(&mut self, _device_id: usize, _ctx: &crate::StepContext, eq: &mut crate::EquationSystem) {
        crate::stamp_resistor(eq, self.a, self.b, self.resistance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_two_named_ports() {
        let r = Resistor::new("r1", 1000.0);
        let ports = r.ports();
        assert_eq!(ports.keys().cloned().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
