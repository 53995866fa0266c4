use crate::defaults::{PULL_UP_OHMS, SUPPLY_VOLTS};
use circuit::devices::{AbsVoltageSource, NTypeMosfet, PullUpResistor};
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A gate made from a single NMOS transistor that performs the NOT function.
#[derive(DeriveComponent)]
pub struct NotGate {
    #[role]
    role: String,
    #[subcomponent]
    nmos: NTypeMosfet,
    #[subcomponent]
    pullup: PullUpResistor,
    #[subcomponent]
    ground: AbsVoltageSource,
    #[port]
    a: Rc<Node>,
    #[port]
    out: Rc<Node>,
    #[port]
    _gnd: Rc<Node>,
}

impl NotGate {
    /// Constructs a new NOT gate.
    pub fn new(role: impl Into<String>) -> Self {
        let nmos = NTypeMosfet::new("nmos");
        let pullup = PullUpResistor::new("pullup", PULL_UP_OHMS, SUPPLY_VOLTS);
        let ground = AbsVoltageSource::ground("gnd");

        let gate = Self {
            role: role.into(),
            nmos,
            pullup,
            ground,
            a: Node::new("a"),
            out: Node::new("out"),
            _gnd: Node::new("_gnd"),
        };

        gate.connect("a", gate.nmos.port_gate()).expect("own port");
        gate.connect("out", gate.nmos.port_drain()).expect("own port");
        gate.connect("out", gate.pullup.port_a()).expect("own port");
        gate.connect("_gnd", gate.nmos.port_source()).expect("own port");
        gate.connect("_gnd", gate.ground.port_a()).expect("own port");

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
impl crate::test_support::OneInputGate for NotGate {
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
    fn not_truth_table() {
        let config = SimConfig::default();
        for &a in &[false, true] {
            let actual = measure_one_input(|| NotGate::new("not"), a, &config);
            assert_eq!(actual, !a, "a={a}");
        }
    }
}
