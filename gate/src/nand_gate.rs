use crate::defaults::{PULL_UP_OHMS, SUPPLY_VOLTS};
use circuit::devices::{AbsVoltageSource, NTypeMosfet, PullUpResistor};
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A gate made from two series NMOS transistors that performs the NAND function: `out` is pulled
/// low only when both `a` and `b` are driven high, and pulled high by [`PullUpResistor`] otherwise.
#[derive(DeriveComponent)]
pub struct NandGate {
    #[role]
    role: String,
    #[subcomponent]
    nmos_a: NTypeMosfet,
    #[subcomponent]
    nmos_b: NTypeMosfet,
    #[subcomponent]
    pullup: PullUpResistor,
    #[subcomponent]
    ground: AbsVoltageSource,
    #[port]
    a: Rc<Node>,
    #[port]
    b: Rc<Node>,
    #[port]
    out: Rc<Node>,
    #[port]
    _mid: Rc<Node>,
    #[port]
    _gnd: Rc<Node>,
}

impl NandGate {
    /// Constructs a new NAND gate.
    pub fn new(role: impl Into<String>) -> Self {
        let nmos_a = NTypeMosfet::new("nmos_a");
        let nmos_b = NTypeMosfet::new("nmos_b");
        let pullup = PullUpResistor::new("pullup", PULL_UP_OHMS, SUPPLY_VOLTS);
        let ground = AbsVoltageSource::ground("gnd");

        let gate = Self {
            role: role.into(),
            nmos_a,
            nmos_b,
            pullup,
            ground,
            a: Node::new("a"),
            b: Node::new("b"),
            out: Node::new("out"),
            _mid: Node::new("_mid"),
            _gnd: Node::new("_gnd"),
        };

        gate.connect("out", gate.pullup.port_a()).expect("own port");
        gate.connect("out", gate.nmos_a.port_drain()).expect("own port");
        gate.connect("a", gate.nmos_a.port_gate()).expect("own port");
        gate.connect("_mid", gate.nmos_a.port_source()).expect("own port");
        gate.connect("_mid", gate.nmos_b.port_drain()).expect("own port");
        gate.connect("b", gate.nmos_b.port_gate()).expect("own port");
        gate.connect("_gnd", gate.nmos_b.port_source()).expect("own port");
        gate.connect("_gnd", gate.ground.port_a()).expect("own port");

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
impl crate::test_support::TwoInputGate for NandGate {
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
    fn nand_truth_table() {
        let config = SimConfig::default();
        for &a in &[false, true] {
            for &b in &[false, true] {
                let actual = measure_two_input(|| NandGate::new("nand"), a, b, &config);
                assert_eq!(actual, !(a && b), "a={a} b={b}");
            }
        }
    }
}
