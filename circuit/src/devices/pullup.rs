use super::{AbsVoltageSource, Resistor};
use crate::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A resistor tied to the supply rail, the standard NMOS-logic pull-up.
///
/// `_vdd` is internal: it connects the pull-up resistor to its own private [`AbsVoltageSource`]
/// and may not be wired to from outside this component (leading-underscore port names are
/// conventionally internal, enforced by [`Component::connect`]).
#[derive(DeriveComponent)]
pub struct PullUpResistor {
    #[role]
    role: String,
    #[subcomponent]
    resistor: Resistor,
    #[subcomponent]
    vdd: AbsVoltageSource,
    #[port]
    a: Rc<Node>,
    #[port]
    _vdd: Rc<Node>,
}

impl PullUpResistor {
    pub fn new(role: impl Into<String>, pull_up_ohms: f64, supply_volts: f64) -> Self {
        let resistor = Resistor::new("pullup", pull_up_ohms);
        let vdd = AbsVoltageSource::new("vdd", supply_volts);
        let a = Node::new("a");
        let vdd_node = Node::new("_vdd");

        let pullup = Self {
            role: role.into(),
            resistor,
            vdd,
            a,
            _vdd: vdd_node,
        };

        pullup
            .connect("a", pullup.resistor.port_a())
            .expect("pull-up resistor's own `a` port always exists");
        pullup
            .connect("_vdd", pullup.resistor.port_b())
            .expect("pull-up resistor's own `_vdd` port always exists");
        pullup
            .connect("_vdd", pullup.vdd.port_a())
            .expect("pull-up resistor's own `_vdd` port always exists");

        pullup
    }

    pub fn port_a(&self) -> &Rc<Node> {
        &self.a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Netlist;

    #[test]
    fn wires_without_a_dangling_node() {
        let pullup = PullUpResistor::new("r1", 5000.0, 5.0);
        let netlist = Netlist::build(&pullup).expect("pull-up resistor is fully wired internally");
        assert_eq!(netlist.atomic_devices().len(), 2);
    }
}
