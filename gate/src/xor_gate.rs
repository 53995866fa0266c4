use crate::NotGate;
use circuit::devices::{AbsVoltageSource, NTypeMosfet, PullUpResistor};
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A gate made from two inverters and four NMOS transistors that performs the XOR function.
///
/// `out` is pulled low through `nmos_a`/`nmos_b` (gated by `a`/`b` directly) in parallel with
/// `nmos_not_a`/`nmos_not_b` (gated by their complements), so it is driven low whenever `a` and
/// `b` agree and left floating high (via [`PullUpResistor`]) whenever they differ.
#[derive(DeriveComponent)]
pub struct XorGate {
    #[role]
    role: String,
    #[subcomponent]
    not_a: NotGate,
    #[subcomponent]
    not_b: NotGate,
    #[subcomponent]
    pullup: PullUpResistor,
    #[subcomponent]
    ground: AbsVoltageSource,
    #[subcomponent]
    nmos_a: NTypeMosfet,
    #[subcomponent]
    nmos_b: NTypeMosfet,
    #[subcomponent]
    nmos_not_a: NTypeMosfet,
    #[subcomponent]
    nmos_not_b: NTypeMosfet,
    #[port]
    a: Rc<Node>,
    #[port]
    b: Rc<Node>,
    #[port]
    _not_a: Rc<Node>,
    #[port]
    _not_b: Rc<Node>,
    #[port]
    _gnd: Rc<Node>,
    #[port]
    _mid_left: Rc<Node>,
    #[port]
    _mid_right: Rc<Node>,
    #[port]
    out: Rc<Node>,
}

impl XorGate {
    /// Constructs a new XOR gate.
    pub fn new(role: impl Into<String>) -> Self {
        let gate = Self {
            role: role.into(),
            not_a: NotGate::new("not_a"),
            not_b: NotGate::new("not_b"),
            pullup: PullUpResistor::new("pullup", crate::defaults::PULL_UP_OHMS, crate::defaults::SUPPLY_VOLTS),
            ground: AbsVoltageSource::ground("gnd"),
            nmos_a: NTypeMosfet::new("nmos_a"),
            nmos_b: NTypeMosfet::new("nmos_b"),
            nmos_not_a: NTypeMosfet::new("nmos_not_a"),
            nmos_not_b: NTypeMosfet::new("nmos_not_b"),
            a: Node::new("a"),
            b: Node::new("b"),
            _not_a: Node::new("_not_a"),
            _not_b: Node::new("_not_b"),
            _gnd: Node::new("_gnd"),
            _mid_left: Node::new("_mid_left"),
            _mid_right: Node::new("_mid_right"),
            out: Node::new("out"),
        };

        gate.connect("a", gate.not_a.port_a()).expect("own port");
        gate.connect("b", gate.not_b.port_a()).expect("own port");
        gate.connect("_not_a", gate.not_a.port_out()).expect("own port");
        gate.connect("_not_b", gate.not_b.port_out()).expect("own port");
        gate.connect("out", gate.pullup.port_a()).expect("own port");
        gate.connect("_gnd", gate.ground.port_a()).expect("own port");

        gate.connect("a", gate.nmos_a.port_gate()).expect("own port");
        gate.connect("b", gate.nmos_b.port_gate()).expect("own port");
        gate.connect("out", gate.nmos_a.port_drain()).expect("own port");
        gate.connect("_mid_right", gate.nmos_a.port_source()).expect("own port");
        gate.connect("_mid_right", gate.nmos_b.port_drain()).expect("own port");
        gate.connect("_gnd", gate.nmos_b.port_source()).expect("own port");

        gate.connect("_not_a", gate.nmos_not_a.port_gate()).expect("own port");
        gate.connect("_not_b", gate.nmos_not_b.port_gate()).expect("own port");
        gate.connect("out", gate.nmos_not_a.port_drain()).expect("own port");
        gate.connect("_mid_left", gate.nmos_not_a.port_source()).expect("own port");
        gate.connect("_mid_left", gate.nmos_not_b.port_drain()).expect("own port");
        gate.connect("_gnd", gate.nmos_not_b.port_source()).expect("own port");

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
impl crate::test_support::TwoInputGate for XorGate {
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
    fn xor_truth_table() {
        let config = SimConfig::default();
        for &a in &[false, true] {
            for &b in &[false, true] {
                let actual = measure_two_input(|| XorGate::new("xor"), a, b, &config);
                assert_eq!(actual, a ^ b, "a={a} b={b}");
            }
        }
    }
}
