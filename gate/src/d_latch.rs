use crate::NandGate;
use circuit::{Component, Node};
use component_derive::Component as DeriveComponent;
use std::rc::Rc;

/// A gated D latch built from four cross-coupled NAND gates: while `clock` is high, `out` follows
/// `data`; when `clock` drops, `out` holds its last value.
#[derive(DeriveComponent)]
pub struct DLatch {
    #[role]
    role: String,
    #[subcomponent]
    nand_1_up: NandGate,
    #[subcomponent]
    nand_1_down: NandGate,
    #[subcomponent]
    nand_2_up: NandGate,
    #[subcomponent]
    nand_2_down: NandGate,
    #[port]
    data: Rc<Node>,
    #[port]
    clock: Rc<Node>,
    #[port]
    out: Rc<Node>,
    #[port]
    not_out: Rc<Node>,
    #[port]
    _mid_up: Rc<Node>,
    #[port]
    _mid_down: Rc<Node>,
}

impl DLatch {
    /// Constructs a new gated D latch.
    pub fn new(role: impl Into<String>) -> Self {
        let latch = Self {
            role: role.into(),
            nand_1_up: NandGate::new("nand1.up"),
            nand_1_down: NandGate::new("nand1.dn"),
            nand_2_up: NandGate::new("nand2.up"),
            nand_2_down: NandGate::new("nand2.dn"),
            data: Node::new("data"),
            clock: Node::new("clock"),
            out: Node::new("out"),
            not_out: Node::new("not_out"),
            _mid_up: Node::new("_mid_up"),
            _mid_down: Node::new("_mid_down"),
        };

        latch.connect("data", latch.nand_1_up.port_a()).expect("own port");
        latch.connect("clock", latch.nand_1_up.port_b()).expect("own port");
        latch.connect("_mid_up", latch.nand_1_down.port_a()).expect("own port");
        latch.connect("clock", latch.nand_1_down.port_b()).expect("own port");

        latch.connect("_mid_up", latch.nand_1_up.port_out()).expect("own port");
        latch.connect("_mid_down", latch.nand_1_down.port_out()).expect("own port");

        latch.connect("_mid_up", latch.nand_2_up.port_a()).expect("own port");
        latch.connect("not_out", latch.nand_2_up.port_b()).expect("own port");
        latch.connect("out", latch.nand_2_down.port_a()).expect("own port");
        latch.connect("_mid_down", latch.nand_2_down.port_b()).expect("own port");

        latch.connect("out", latch.nand_2_up.port_out()).expect("own port");
        latch.connect("not_out", latch.nand_2_down.port_out()).expect("own port");

        latch
    }

    /// Returns the `data` input port.
    pub fn port_data(&self) -> &Rc<Node> {
        &self.data
    }
    /// Returns the `clock` input port.
    pub fn port_clock(&self) -> &Rc<Node> {
        &self.clock
    }
    /// Returns the `out` output port.
    pub fn port_out(&self) -> &Rc<Node> {
        &self.out
    }
    /// Returns the `not_out` output port.
    pub fn port_not_out(&self) -> &Rc<Node> {
        &self.not_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit::devices::AbsVoltageSource;
    use circuit::{Netlist, SimConfig, Simulation};
    use indexmap::IndexMap;

    /// Wires a [`DLatch`] behind fixed-voltage `data`/`clock` drivers for one settle-and-read pass.
    struct Harness {
        latch: DLatch,
        drive_data: AbsVoltageSource,
        drive_clock: AbsVoltageSource,
        link_data: Rc<Node>,
        link_clock: Rc<Node>,
    }

    impl Harness {
        fn new(data: bool, clock: bool, config: &SimConfig) -> Self {
            let volts = |h: bool| if h { config.voltage } else { 0.0 };
            let harness = Self {
                latch: DLatch::new("latch"),
                drive_data: AbsVoltageSource::new("drive_data", volts(data)),
                drive_clock: AbsVoltageSource::new("drive_clock", volts(clock)),
                link_data: Node::new("link_data"),
                link_clock: Node::new("link_clock"),
            };
            harness.connect("link_data", harness.latch.port_data()).expect("own port");
            harness.connect("link_data", harness.drive_data.port_a()).expect("own port");
            harness.connect("link_clock", harness.latch.port_clock()).expect("own port");
            harness.connect("link_clock", harness.drive_clock.port_a()).expect("own port");
            harness
        }
    }

    impl Component for Harness {
        fn component_name(&self) -> &'static str {
            "d_latch_harness"
        }
        fn role(&self) -> &str {
            "harness"
        }
        fn ports(&self) -> IndexMap<String, Rc<Node>> {
            let mut m = IndexMap::new();
            m.insert("link_data".to_string(), self.link_data.clone());
            m.insert("link_clock".to_string(), self.link_clock.clone());
            m
        }
        fn sub_components(&self) -> IndexMap<String, &dyn Component> {
            let mut m = IndexMap::new();
            m.insert("latch".to_string(), &self.latch as &dyn Component);
            m.insert("drive_data".to_string(), &self.drive_data as &dyn Component);
            m.insert("drive_clock".to_string(), &self.drive_clock as &dyn Component);
            m
        }
    }

    fn settled_out(data: bool, clock: bool, config: &SimConfig) -> bool {
        let harness = Harness::new(data, clock, config);
        let out = harness.latch.port_out().clone();
        let netlist = Netlist::build(&harness).expect("d latch harness is fully wired");
        let devices: Vec<_> = netlist
            .atomic_devices()
            .iter()
            .map(|d| d.make_sim_device(&netlist))
            .collect();
        let mut sim = Simulation::new(devices, netlist.num_groups());
        for _ in 0..2000 {
            sim.step(config.timestep_us);
        }
        let voltage = sim.voltage(netlist.group_id(&out));
        if voltage >= config.high_threshold {
            true
        } else if voltage <= config.low_threshold {
            false
        } else {
            panic!("settled output {voltage} V is neither a clean HIGH nor LOW");
        }
    }

    #[test]
    fn transparent_while_clocked() {
        let config = SimConfig::default();
        assert!(settled_out(true, true, &config));
        assert!(!settled_out(false, true, &config));
    }
}
