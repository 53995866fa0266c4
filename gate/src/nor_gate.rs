use crate::defaults::{PULL_UP_OHMS, SUPPLY_VOLTS};
use circuit::devices::{AbsVoltageSource, NTypeMosfet, PullUpResistor};
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A gate made from two parallel NMOS transistors that performs the NOR function: `out` is pulled
/// low whenever either `a` or `b` is driven high.
#[derive(DeriveComponent)]
pub struct NorGate {
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
    _gnd: Rc<Node>,
}

impl NorGate {
    /// Constructs a new NOR gate.
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
            _gnd: Node::new("_gnd"),
        };

        gate.connect("out", gate.pullup.port_a()).expect("own port");
        gate.connect("out", gate.nmos_a.port_drain()).expect("own port");
        gate.connect("out", gate.nmos_b.port_drain()).expect("own port");
        gate.connect("a", gate.nmos_a.port_gate()).expect("own port");
        gate.connect("b", gate.nmos_b.port_gate()).expect("own port");
        gate.connect("_gnd", gate.nmos_a.port_source()).expect("own port");
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
impl crate::test_support::TwoInputGate for NorGate {
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
    fn nor_truth_table() {
        let config = SimConfig::default();
        for &a in &[false, true] {
            for &b in &[false, true] {
                let actual = measure_two_input(|| NorGate::new("nor"), a, b, &config);
                assert_eq!(actual, !(a || b), "a={a} b={b}");
            }
        }
    }
}
