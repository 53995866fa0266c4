use crate::NotGate;
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A gate that performs the identity function. Made from two NOT gates.
#[derive(DeriveComponent)]
pub struct BufferGate {
    #[role]
    role: String,
    #[subcomponent]
    not_a: NotGate,
    #[subcomponent]
    not_b: NotGate,
    #[port]
    a: Rc<Node>,
    #[port]
    _mid: Rc<Node>,
    #[port]
    out: Rc<Node>,
}

impl BufferGate {
    /// Constructs a new buffer gate.
    pub fn new(role: impl Into<String>) -> Self {
        let gate = Self {
            role: role.into(),
            not_a: NotGate::new("not_a"),
            not_b: NotGate::new("not_b"),
            a: Node::new("a"),
            _mid: Node::new("_mid"),
            out: Node::new("out"),
        };

        gate.connect("a", gate.not_a.port_a()).expect("own port");
        gate.connect("_mid", gate.not_a.port_out()).expect("own port");
        gate.connect("_mid", gate.not_b.port_a()).expect("own port");
        gate.connect("out", gate.not_b.port_out()).expect("own port");

        gate
    }

    /// Returns the `a` input port.
    pub fn port_a(&self) -> &Rc<Node> {
        &self.a
    }
    /// Returns the `out` output port.
    pub fn port_out(&self) -> &Rc<Node> {
        &self.out
    }
}

#[cfg(test)]
impl crate::test_support::OneInputGate for BufferGate {
    fn port_in(&self) -> &Rc<Node> {
        self.port_a()
    }
    fn port_out(&self) -> &Rc<Node> {
        self.port_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::measure_one_input;
    use circuit::SimConfig;

    #[test]
    fn buffer_truth_table() {
        let config = SimConfig::default();
        for &a in &[false, true] {
            let actual = measure_one_input(|| BufferGate::new("buf"), a, &config);
            assert_eq!(actual, a, "a={a}");
        }
    }
}
