use crate::{NorGate, NotGate};
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A composite gate that performs the OR function. Made from a NOR gate and a NOT gate.
#[derive(DeriveComponent)]
pub struct OrGate {
    #[role]
    role: String,
    #[subcomponent]
    nor_gate: NorGate,
    #[subcomponent]
    not_gate: NotGate,
    #[port]
    a: Rc<Node>,
    #[port]
    b: Rc<Node>,
    #[port]
    _nor_res: Rc<Node>,
    #[port]
    out: Rc<Node>,
}

impl OrGate {
    /// Constructs a new OR gate.
    pub fn new(role: impl Into<String>) -> Self {
        let nor_gate = NorGate::new("nor");
        let not_gate = NotGate::new("not");

        let gate = Self {
            role: role.into(),
            nor_gate,
            not_gate,
            a: Node::new("a"),
            b: Node::new("b"),
            _nor_res: Node::new("_nor_res"),
            out: Node::new("out"),
        };

        gate.connect("a", gate.nor_gate.port_a()).expect("own port");
        gate.connect("b", gate.nor_gate.port_b()).expect("own port");
        gate.connect("_nor_res", gate.nor_gate.port_out()).expect("own port");
        gate.connect("_nor_res", gate.not_gate.port_a()).expect("own port");
        gate.connect("out", gate.not_gate.port_out()).expect("own port");

        gate
    }

    /// Returns the `a` input port.
    pub fn port_a(&self) -> &Rc<Node> {
        &self.a
    }
    /// Returns the `b` input port.
    pub fn port_b(&self) -> &Rc<Node> {
        &self.b
    }
    /// Returns the `out` output port.
    pub fn port_out(&self) -> &Rc<Node> {
        &self.out
    }
}

#[cfg(test)]
impl crate::test_support::TwoInputGate for OrGate {
    fn port_a(&self) -> &Rc<Node> {
        self.port_a()
    }
    fn port_b(&self) -> &Rc<Node> {
        self.port_b()
    }
    fn port_out(&self) -> &Rc<Node> {
        self.port_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::measure_two_input;
    use circuit::SimConfig;

    #[test]
    fn or_truth_table() {
        let config = SimConfig::default();
        for &a in &[false, true] {
            for &b in &[false, true] {
                let actual = measure_two_input(|| OrGate::new("or"), a, b, &config);
                assert_eq!(actual, a || b, "a={a} b={b}");
            }
        }
    }
}
