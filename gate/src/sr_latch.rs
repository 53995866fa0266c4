use crate::NorGate;
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A set-reset latch built from two cross-coupled NOR gates.
#[derive(DeriveComponent)]
pub struct SrLatch {
    #[role]
    role: String,
    #[subcomponent]
    nor_up: NorGate,
    #[subcomponent]
    nor_down: NorGate,
    #[port]
    s: Rc<Node>,
    #[port]
    r: Rc<Node>,
    #[port]
    q: Rc<Node>,
    #[port]
    q_not: Rc<Node>,
}

impl SrLatch {
    /// Constructs a new set-reset latch.
    pub fn new(role: impl Into<String>) -> Self {
        let latch = Self {
            role: role.into(),
            nor_up: NorGate::new("up"),
            nor_down: NorGate::new("down"),
            s: Node::new("s"),
            r: Node::new("r"),
            q: Node::new("q"),
            q_not: Node::new("q_not"),
        };

        latch.connect("r", latch.nor_up.port_a()).expect("own port");
        latch.connect("q_not", latch.nor_up.port_b()).expect("own port");
        latch.connect("q", latch.nor_down.port_a()).expect("own port");
        latch.connect("s", latch.nor_down.port_b()).expect("own port");

        latch.connect("q", latch.nor_up.port_out()).expect("own port");
        latch.connect("q_not", latch.nor_down.port_out()).expect("own port");

        latch
    }

    /// Returns the `s` (set) input port.
    pub fn port_s(&self) -> &Rc<Node> {
        &self.s
    }
    /// Returns the `r` (reset) input port.
    pub fn port_r(&self) -> &Rc<Node> {
        &self.r
    }
    /// Returns the `q` output port.
    pub fn port_q(&self) -> &Rc<Node> {
        &self.q
    }
    /// Returns the `q_not` output port.
    pub fn port_q_not(&self) -> &Rc<Node> {
        &self.q_not
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit::devices::AbsVoltageSource;
    use circuit::{Netlist, SimConfig, Simulation};
    use indexmap::IndexMap;

    /// Wires an [`SrLatch`] behind fixed-voltage `s`/`r` drivers for one settle-and-read pass.
    struct Harness {
        latch: SrLatch,
        drive_s: AbsVoltageSource,
        drive_r: AbsVoltageSource,
        link_s: Rc<Node>,
        link_r: Rc<Node>,
    }

    impl Harness {
        fn new(s: bool, r: bool, config: &SimConfig) -> Self {
            let volts = |h: bool| if h { config.voltage } else { 0.0 };
            let harness = Self {
                latch: SrLatch::new("latch"),
                drive_s: AbsVoltageSource::new("drive_s", volts(s)),
                drive_r: AbsVoltageSource::new("drive_r", volts(r)),
                link_s: Node::new("link_s"),
                link_r: Node::new("link_r"),
            };
            harness.connect("link_s", harness.latch.port_s()).expect("own port");
            harness.connect("link_s", harness.drive_s.port_a()).expect("own port");
            harness.connect("link_r", harness.latch.port_r()).expect("own port");
            harness.connect("link_r", harness.drive_r.port_a()).expect("own port");
            harness
        }
    }

    impl Component for Harness {
        fn component_name(&self) -> &'static str {
            "sr_latch_harness"
        }
        fn role(&self) -> &str {
            "harness"
        }
        fn ports(&self) -> IndexMap<String, Rc<Node>> {
            let mut m = IndexMap::new();
            m.insert("link_s".to_string(), self.link_s.clone());
            m.insert("link_r".to_string(), self.link_r.clone());
            m
        }
        fn sub_components(&self) -> IndexMap<String, &dyn Component> {
            let mut m = IndexMap::new();
            m.insert("latch".to_string(), &self.latch as &dyn Component);
            m.insert("drive_s".to_string(), &self.drive_s as &dyn Component);
            m.insert("drive_r".to_string(), &self.drive_r as &dyn Component);
            m
        }
    }

    fn settled_q(s: bool, r: bool, config: &SimConfig) -> bool {
        let harness = Harness::new(s, r, config);
        let q = harness.latch.port_q().clone();
        let netlist = Netlist::build(&harness).expect("sr latch harness is fully wired");
        let devices: Vec<_> = netlist
            .atomic_devices()
            .iter()
            .map(|d| d.make_sim_device(&netlist))
            .collect();
        let mut sim = Simulation::new(devices, netlist.num_groups());
        for _ in 0..2000 {
            sim.step(config.timestep_us);
        }
        let voltage = sim.voltage(netlist.group_id(&q));
        voltage >= config.high_threshold
    }

    #[test]
    fn set_drives_q_high() {
        let config = SimConfig::default();
        assert!(settled_q(true, false, &config));
    }

    #[test]
    fn reset_drives_q_low() {
        let config = SimConfig::default();
        assert!(!settled_q(false, true, &config));
    }
}
