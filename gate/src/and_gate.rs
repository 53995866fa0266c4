use crate::{NandGate, NotGate};
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A composite gate that performs the AND function. Made from a NAND gate and a NOT gate.
#[derive(DeriveComponent)]
pub struct AndGate {
    #[role]
    role: String,
    #[subcomponent]
    nand_gate: NandGate,
    #[subcomponent]
    not_gate: NotGate,
    #[port]
    a: Rc<Node>,
    #[port]
    b: Rc<Node>,
    #[port]
    _nand_res: Rc<Node>,
    #[port]
    out: Rc<Node>,
}

impl AndGate {
    /// Constructs a new AND gate.
    pub fn new(role: impl Into<String>) -> Self {
        let nand_gate = NandGate::new("nand");
        let not_gate = NotGate::new("not");

        let gate = Self {
            role: role.into(),
            nand_gate,
            not_gate,
            a: Node::new("a"),
            b: Node::new("b"),
            _nand_res: Node::new("_nand_res"),
            out: Node::new("out"),
        };

        gate.connect("a", gate.nand_gate.port_a()).expect("own port");
        gate.connect("b", gate.nand_gate.port_b()).expect("own port");
        gate.connect("_nand_res", gate.nand_gate.port_out()).expect("own port");
        gate.connect("_nand_res", gate.not_gate.port_a()).expect("own port");
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
impl crate::test_support::TwoInputGate for AndGate {
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
    fn and_truth_table() {
        let config = SimConfig::default();
        for &a in &[false, true] {
            for &b in &[false, true] {
                let actual = measure_two_input(|| AndGate::new("and"), a, b, &config);
                assert_eq!(actual, a && b, "a={a} b={b}");
            }
        }
    }
}
