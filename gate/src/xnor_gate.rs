use crate::{NotGate, XorGate};
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A composite gate that performs the XNOR function. Made from an XOR gate and a NOT gate.
#[derive(DeriveComponent)]
pub struct XnorGate {
    #[role]
    role: String,
    #[subcomponent]
    xor_gate: XorGate,
    #[subcomponent]
    not_gate: NotGate,
    #[port]
    a: Rc<Node>,
    #[port]
    b: Rc<Node>,
    #[port]
    _xor_res: Rc<Node>,
    #[port]
    out: Rc<Node>,
}

impl XnorGate {
    /// Constructs a new XNOR gate.
    pub fn new(role: impl Into<String>) -> Self {
        let gate = Self {
            role: role.into(),
            xor_gate: XorGate::new("xor"),
            not_gate: NotGate::new("not"),
            a: Node::new("a"),
            b: Node::new("b"),
            _xor_res: Node::new("_xor_res"),
            out: Node::new("out"),
        };

        gate.connect("a", gate.xor_gate.port_a()).expect("own port");
        gate.connect("b", gate.xor_gate.port_b()).expect("own port");
        gate.connect("_xor_res", gate.xor_gate.port_out()).expect("own port");
        gate.connect("_xor_res", gate.not_gate.port_a()).expect("own port");
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
impl crate::test_support::TwoInputGate for XnorGate {
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
    fn xnor_truth_table() {
        let config = SimConfig::default();
        for &a in &[false, true] {
            for &b in &[false, true] {
                let actual = measure_two_input(|| XnorGate::new("xnor"), a, b, &config);
                assert_eq!(actual, !(a ^ b), "a={a} b={b}");
            }
        }
    }
}
