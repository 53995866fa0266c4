//! Shared truth-table test harness for the NMOS-logic gates in this crate.
//!
//! Every gate bottoms out in [`circuit`]'s MOSFET/resistor MNA model rather than an instantaneous
//! logic-value propagation, so "driving an input" means building a fresh netlist with an
//! [`AbsVoltageSource`] tied to each input and stepping [`Simulation`] until the output settles.

use circuit::devices::AbsVoltageSource;
use circuit::{Component, Netlist, Node, SimConfig, Simulation};
use indexmap::IndexMap;
use std::rc::Rc;

/// Number of simulation steps to run before reading a settled output voltage. Empirically enough
/// for this crate's RC time constants at the default timestep to settle within floating
/// point tolerance.
const SETTLE_STEPS: usize = 2000;

pub trait TwoInputGate: Component {
    fn port_a(&self) -> &Rc<Node>;
    fn port_b(&self) -> &Rc<Node>;
    fn port_out(&self) -> &Rc<Node>;
}

pub trait OneInputGate: Component {
    fn port_in(&self) -> &Rc<Node>;
    fn port_out(&self) -> &Rc<Node>;
}

struct TwoInputHarness<G: TwoInputGate> {
    gate: G,
    drive_a: AbsVoltageSource,
    drive_b: AbsVoltageSource,
    link_a: Rc<Node>,
    link_b: Rc<Node>,
}

impl<G: TwoInputGate> TwoInputHarness<G> {
    fn new(gate: G, a_high: bool, b_high: bool, config: &SimConfig) -> Self {
        let volts = |high: bool| if high { config.voltage } else { 0.0 };
        let harness = Self {
            gate,
            drive_a: AbsVoltageSource::new("drive_a", volts(a_high)),
            drive_b: AbsVoltageSource::new("drive_b", volts(b_high)),
            link_a: Node::new("link_a"),
            link_b: Node::new("link_b"),
        };
        harness.connect("link_a", harness.gate.port_a()).expect("own port");
        harness.connect("link_a", harness.drive_a.port_a()).expect("own port");
        harness.connect("link_b", harness.gate.port_b()).expect("own port");
        harness.connect("link_b", harness.drive_b.port_a()).expect("own port");
        harness
    }
}

impl<G: TwoInputGate> Component for TwoInputHarness<G> {
    fn component_name(&self) -> &'static str {
        "two_input_harness"
    }
    fn role(&self) -> &str {
        "harness"
    }
    fn ports(&self) -> IndexMap<String, Rc<Node>> {
        let mut m = IndexMap::new();
        m.insert("link_a".to_string(), self.link_a.clone());
        m.insert("link_b".to_string(), self.link_b.clone());
        m
    }
    fn sub_components(&self) -> IndexMap<String, &dyn Component> {
        let mut m = IndexMap::new();
        m.insert("gate".to_string(), &self.gate as &dyn Component);
        m.insert("drive_a".to_string(), &self.drive_a as &dyn Component);
        m.insert("drive_b".to_string(), &self.drive_b as &dyn Component);
        m
    }
}

struct OneInputHarness<G: OneInputGate> {
    gate: G,
    drive: AbsVoltageSource,
    link: Rc<Node>,
}

impl<G: OneInputGate> OneInputHarness<G> {
    fn new(gate: G, high: bool, config: &SimConfig) -> Self {
        let harness = Self {
            gate,
            drive: AbsVoltageSource::new("drive", if high { config.voltage } else { 0.0 }),
            link: Node::new("link"),
        };
        harness.connect("link", harness.gate.port_in()).expect("own port");
        harness.connect("link", harness.drive.port_a()).expect("own port");
        harness
    }
}

impl<G: OneInputGate> Component for OneInputHarness<G> {
    fn component_name(&self) -> &'static str {
        "one_input_harness"
    }
    fn role(&self) -> &str {
        "harness"
    }
    fn ports(&self) -> IndexMap<String, Rc<Node>> {
        let mut m = IndexMap::new();
        m.insert("link".to_string(), self.link.clone());
        m
    }
    fn sub_components(&self) -> IndexMap<String, &dyn Component> {
        let mut m = IndexMap::new();
        m.insert("gate".to_string(), &self.gate as &dyn Component);
        m.insert("drive".to_string(), &self.drive as &dyn Component);
        m
    }
}

fn settle(root: &dyn Component, out_port: &Rc<Node>, config: &SimConfig) -> f64 {
    let netlist = Netlist::build(root).expect("harness is fully wired");
    let devices: Vec<_> = netlist
        .atomic_devices()
        .iter()
        .map(|d| d.make_sim_device(&netlist))
        .collect();
    let mut sim = Simulation::new(devices, netlist.num_groups());
    let dt = config.timestep_us;
    for _ in 0..SETTLE_STEPS {
        sim.step(dt);
    }
    sim.voltage(netlist.group_id(out_port))
}

/// Builds `gate`, drives `a`/`b` to the given logic levels, settles the simulation, and returns
/// whether the output reads as logic HIGH. Panics if the settled voltage lands in the
/// indeterminate band between [`SimConfig::low_threshold`] and [`SimConfig::high_threshold`].
pub fn measure_two_input<G: TwoInputGate>(
    make_gate: impl FnOnce() -> G,
    a: bool,
    b: bool,
    config: &SimConfig,
) -> bool {
    let harness = TwoInputHarness::new(make_gate(), a, b, config);
    let out = harness.gate.port_out().clone();
    let voltage = settle(&harness, &out, config);
    if voltage >= config.high_threshold {
        true
    } else if voltage <= config.low_threshold {
        false
    } else {
        panic!("settled output {voltage} V is neither a clean HIGH nor LOW");
    }
}

/// Single-input counterpart of [`measure_two_input`].
pub fn measure_one_input<G: OneInputGate>(
    make_gate: impl FnOnce() -> G,
    input: bool,
    config: &SimConfig,
) -> bool {
    let harness = OneInputHarness::new(make_gate(), input, config);
    let out = harness.gate.port_out().clone();
    let voltage = settle(&harness, &out, config);
    if voltage >= config.high_threshold {
        true
    } else if voltage <= config.low_threshold {
        false
    } else {
        panic!("settled output {voltage} V is neither a clean HIGH nor LOW");
    }
}
