use crate::{AndGate, NotGate, OrGate};
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A gate that passes `input` through to `out` while `enable` is driven high.
///
/// This NMOS-logic family has no complementary (PMOS) device to disconnect the pull-up rail, so a
/// literal floating/high-impedance output cannot be expressed in the MNA model. Disabled output is
/// therefore approximated as weak logic HIGH — the same level the pull-up would settle to if
/// genuinely disconnected — rather than an undefined voltage:
/// `out = (input AND enable) OR (NOT enable)`.
#[derive(DeriveComponent)]
pub struct TriStateBufferGate {
    #[role]
    role: String,
    #[subcomponent]
    masked: AndGate,
    #[subcomponent]
    not_enable: NotGate,
    #[subcomponent]
    combine: OrGate,
    #[port]
    enable: Rc<Node>,
    #[port]
    input: Rc<Node>,
    #[port]
    _masked: Rc<Node>,
    #[port]
    _not_enable: Rc<Node>,
    #[port]
    out: Rc<Node>,
}

impl TriStateBufferGate {
    /// Constructs a new tri-state buffer gate.
    pub fn new(role: impl Into<String>) -> Self {
        let gate = Self {
            role: role.into(),
            masked: AndGate::new("masked"),
            not_enable: NotGate::new("not_enable"),
            combine: OrGate::new("combine"),
            enable: Node::new("enable"),
            input: Node::new("input"),
            _masked: Node::new("_masked"),
            _not_enable: Node::new("_not_enable"),
            out: Node::new("out"),
        };

        gate.connect("input", gate.masked.port_a()).expect("own port");
        gate.connect("enable", gate.masked.port_b()).expect("own port");
        gate.connect("enable", gate.not_enable.port_a()).expect("own port");

        gate.connect("_masked", gate.masked.port_out()).expect("own port");
        gate.connect("_masked", gate.combine.port_a()).expect("own port");
        gate.connect("_not_enable", gate.not_enable.port_out()).expect("own port");
        gate.connect("_not_enable", gate.combine.port_b()).expect("own port");

        gate.connect("out", gate.combine.port_out()).expect("own port");

        gate
    }

    /// Returns the `enable` input port.
    pub fn port_enable(&self) -> &Rc<Node> {
        &self.enable
    }
    /// Returns the `input` input port.
    pub fn port_input(&self) -> &Rc<Node> {
        &self.input
    }
    /// Returns the `out` output port.
    pub fn port_out(&self) -> &Rc<Node> {
        &self.out
    }
}

#[cfg(test)]
impl crate::test_support::TwoInputGate for TriStateBufferGate {
    fn port_a(&self) -> &Rc<Node> {
        self.port_input()
    }
    fn port_b(&self) -> &Rc<Node> {
        self.port_enable()
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
    fn passes_input_when_enabled_and_floats_high_when_disabled() {
        let config = SimConfig::default();
        for &input in &[false, true] {
            for &enable in &[false, true] {
                let actual = measure_two_input(|| TriStateBufferGate::new("tsb"), input, enable, &config);
                let expected = if enable { input } else { true };
                assert_eq!(actual, expected, "input={input} enable={enable}");
            }
        }
    }
}
