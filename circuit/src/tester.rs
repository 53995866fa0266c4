use crate::{Component, Netlist, PiecewiseLinearInput, SimConfig, Simulation};
use indexmap::IndexMap;

/// A time-keyed voltage waveform to drive onto one input port, produced by
/// [`construct_linear_piecewise_input`] and consumed by [`run_in_simulator`].
pub type PiecewiseInputByNode = IndexMap<String, Vec<(f64, f64)>>;

/// Turns `(time_us, [0|1] per node)` breakpoints into piecewise-linear ramps between `0 V` and
/// `config.voltage`, each transition taking `transition_time_us`.
///
/// `intervals[0]` is the steady starting level; every later interval both restates the previous
/// level at its own start time and reaches its new level `transition_time_us` later, producing a
/// ramp rather than a step.
pub fn construct_linear_piecewise_input(
    nodes: &[String],
    transition_time_us: f64,
    intervals: &[(f64, Vec<f64>)],
    config: &SimConfig,
) -> PiecewiseInputByNode {
    let mut pieces: PiecewiseInputByNode = nodes.iter().map(|n| (n.clone(), Vec::new())).collect();

    for (interval_num, (time, levels)) in intervals.iter().enumerate() {
        assert_eq!(levels.len(), nodes.len(), "one level per input node required");

        if interval_num == 0 {
            for (node, level) in nodes.iter().zip(levels) {
                pieces.get_mut(node).unwrap().push((*time, level * config.voltage));
            }
        } else {
            let (_, old_levels) = &intervals[interval_num - 1];
            for (node, level) in nodes.iter().zip(old_levels) {
                pieces.get_mut(node).unwrap().push((*time, level * config.voltage));
            }
            for (node, level) in nodes.iter().zip(levels) {
                pieces
                    .get_mut(node)
                    .unwrap()
                    .push((*time + transition_time_us, level * config.voltage));
            }
        }
    }

    pieces
}

/// A scripted scenario: build a component, drive it with waveforms, and assert logic-level
/// outputs at checkpoints.
pub trait Test {
    fn test_name(&self) -> &str;
    fn output_nodes(&self) -> Vec<String>;
    fn test_length_us(&self) -> f64;
    fn make_component(&self) -> Box<dyn Component>;
    fn make_input(&self, component: &dyn Component, config: &SimConfig) -> PiecewiseInputByNode;
    fn check_output(&self, component: &dyn Component, get_output: &dyn Fn(f64) -> IndexMap<String, f64>);
}

/// Builds `test`'s component, simulates it for its full declared length, and runs its assertions.
///
/// Recoverable circuit-construction errors ([`crate::CircuitError`]) propagate; a malformed
/// `Test` implementation (e.g. an output port that doesn't exist) panics, per this crate's policy
/// that only the component-build path produces recoverable errors.
pub fn run_in_simulator(test: &dyn Test, config: &SimConfig) -> Result<(), crate::CircuitError> {
    let component = test.make_component();
    let netlist = Netlist::build(component.as_ref())?;

    let devices = netlist
        .atomic_devices()
        .iter()
        .map(|d| d.make_sim_device(&netlist))
        .collect();
    let mut sim = Simulation::new(devices, netlist.num_groups());

    let ports = component.ports();
    let inputs = test.make_input(component.as_ref(), config);
    for (node_name, points) in &inputs {
        let node = ports
            .get(node_name)
            .unwrap_or_else(|| panic!("test input port `{node_name}` does not exist"));
        let group = netlist.group_id(node);
        sim.add_pre_step_hook(Box::new(PiecewiseLinearInput::new(
            group,
            points.clone(),
            format!("test_in_{node_name}"),
        )));
    }

    let output_groups: Vec<(String, usize)> = test
        .output_nodes()
        .into_iter()
        .map(|name| {
            let node = ports
                .get(&name)
                .unwrap_or_else(|| panic!("test output port `{name}` does not exist"));
            (name, netlist.group_id(node))
        })
        .collect();

    let dt = config.timestep_us;
    let steps = (test.test_length_us() / dt).ceil() as usize;
    let mut history: Vec<(f64, IndexMap<String, f64>)> = Vec::with_capacity(steps + 1);
    history.push((
        0.0,
        output_groups
            .iter()
            .map(|(name, g)| (name.clone(), sim.voltage(*g)))
            .collect(),
    ));

    for _ in 0..steps {
        sim.step(dt);
        let sample = output_groups
            .iter()
            .map(|(name, g)| (name.clone(), sim.voltage(*g)))
            .collect();
        history.push((sim.time(), sample));
    }

    let get_output = |time_us: f64| -> IndexMap<String, f64> {
        match history
            .iter()
            .rev()
            .find(|(sample_time, _)| *sample_time <= time_us)
        {
            Some((_, sample)) => sample.clone(),
            None => history[0].1.clone(),
        }
    };

    test.check_output(component.as_ref(), &get_output);
    Ok(())
}

fn assert_logic_level(
    value: f64,
    expected_high: bool,
    config: &SimConfig,
    context: impl Fn() -> String,
) {
    let is_correct = if expected_high {
        value > config.high_threshold
    } else {
        value < config.low_threshold
    };
    assert!(is_correct, "{}", context());
}

/// Enumerates every (pre, post) pair of Boolean input states, driving pre→post transitions spaced
/// by `expected_gate_delay_us` apart and checking the post-state output just before the next
/// transition.
pub struct StatelessGateTest {
    pub test_name: String,
    pub output_nodes: Vec<String>,
    pub input_nodes: Vec<String>,
    pub expected_gate_delay_us: f64,
    pub make_component: Box<dyn Fn() -> Box<dyn Component>>,
    pub expected_output: Box<dyn Fn(&[bool]) -> Vec<bool>>,
}

impl StatelessGateTest {
    fn input_pieces(&self) -> Vec<(f64, Vec<f64>)> {
        let n = self.input_nodes.len();
        let mut pieces = Vec::new();
        let mut time = 0.0;
        for combo in 0..(1u32 << (2 * n)) {
            let bits: Vec<f64> = (0..2 * n)
                .map(|i| ((combo >> (2 * n - 1 - i)) & 1) as f64)
                .collect();
            pieces.push((time, bits[..n].to_vec()));
            time += self.expected_gate_delay_us;
            pieces.push((time, bits[n..].to_vec()));
            time += self.expected_gate_delay_us;
        }
        pieces
    }
}

impl Test for StatelessGateTest {
    fn test_name(&self) -> &str {
        &self.test_name
    }
    fn output_nodes(&self) -> Vec<String> {
        self.output_nodes.clone()
    }
    fn test_length_us(&self) -> f64 {
        let num_states = 2f64.powi(2 * self.input_nodes.len() as i32) + 1.0;
        self.expected_gate_delay_us * (2.0 * num_states + 1.0)
    }
    fn make_component(&self) -> Box<dyn Component> {
        (self.make_component)()
    }
    fn make_input(&self, _component: &dyn Component, config: &SimConfig) -> PiecewiseInputByNode {
        construct_linear_piecewise_input(&self.input_nodes, config.transition_time_us, &self.input_pieces(), config)
    }
    fn check_output(&self, _component: &dyn Component, get_output: &dyn Fn(f64) -> IndexMap<String, f64>) {
        let config = SimConfig::default();
        for piece in self.input_pieces() {
            let check_time_us = piece.0 + self.expected_gate_delay_us - 0.1;
            let actual = get_output(check_time_us);
            let input_bits: Vec<bool> = piece.1.iter().map(|&v| v != 0.0).collect();
            let expected = (self.expected_output)(&input_bits);
            assert_eq!(self.output_nodes.len(), expected.len());

            for (output_node, &expect_high) in self.output_nodes.iter().zip(&expected) {
                let value = actual[output_node];
                assert_logic_level(value, expect_high, &config, || {
                    format!(
                        "{}: incorrect value @ t={check_time_us}us: input={input_bits:?} node={output_node} value={value}",
                        self.test_name
                    )
                });
            }
        }
    }
}

/// Like [`StatelessGateTest`], but enumerates each Boolean input only once, holding the prior
/// value at its complement — a heuristic that maximizes switching activity per sample.
pub struct QuickStatelessGateTest {
    pub test_name: String,
    pub output_nodes: Vec<String>,
    pub input_nodes: Vec<String>,
    pub expected_gate_delay_us: f64,
    pub make_component: Box<dyn Fn() -> Box<dyn Component>>,
    pub expected_output: Box<dyn Fn(&[bool]) -> Vec<bool>>,
}

impl QuickStatelessGateTest {
    fn input_pieces(&self) -> Vec<(f64, Vec<f64>)> {
        let n = self.input_nodes.len();
        let mut pieces = Vec::new();
        let mut time = 0.0;
        for bit in 0..n {
            let post: Vec<f64> = (0..n).map(|i| if i == bit { 1.0 } else { 0.0 }).collect();
            let pre: Vec<f64> = post.iter().map(|v| 1.0 - v).collect();
            pieces.push((time, pre));
            time += self.expected_gate_delay_us;
            pieces.push((time, post));
            time += self.expected_gate_delay_us;
        }
        pieces
    }
}

impl Test for QuickStatelessGateTest {
    fn test_name(&self) -> &str {
        &self.test_name
    }
    fn output_nodes(&self) -> Vec<String> {
        self.output_nodes.clone()
    }
    fn test_length_us(&self) -> f64 {
        let n = self.input_nodes.len() as f64;
        self.expected_gate_delay_us * (2.0 * n + 1.0)
    }
    fn make_component(&self) -> Box<dyn Component> {
        (self.make_component)()
    }
    fn make_input(&self, _component: &dyn Component, config: &SimConfig) -> PiecewiseInputByNode {
        construct_linear_piecewise_input(&self.input_nodes, config.transition_time_us, &self.input_pieces(), config)
    }
    fn check_output(&self, _component: &dyn Component, get_output: &dyn Fn(f64) -> IndexMap<String, f64>) {
        let config = SimConfig::default();
        for piece in self.input_pieces() {
            let check_time_us = piece.0 + self.expected_gate_delay_us - 0.1;
            let actual = get_output(check_time_us);
            let input_bits: Vec<bool> = piece.1.iter().map(|&v| v != 0.0).collect();
            let expected = (self.expected_output)(&input_bits);

            for (output_node, &expect_high) in self.output_nodes.iter().zip(&expected) {
                let value = actual[output_node];
                assert_logic_level(value, expect_high, &config, || {
                    format!(
                        "{}: incorrect value @ t={check_time_us}us: input={input_bits:?} node={output_node} value={value}",
                        self.test_name
                    )
                });
            }
        }
    }
}

/// A single scripted checkpoint: at `time_us`, set the listed input levels and (optionally)
/// assert the listed output logic levels.
pub struct StatefulEvent {
    pub time_us: f64,
    pub expected_outputs: IndexMap<String, bool>,
    pub input_levels: Vec<f64>,
}

/// Drives a stateful component (latches, registers, ...) through a hand-written event script
/// rather than an exhaustive enumeration.
pub struct ComponentWithStateTest {
    pub test_name: String,
    pub output_nodes: Vec<String>,
    pub input_nodes: Vec<String>,
    pub make_component: Box<dyn Fn() -> Box<dyn Component>>,
    pub events: Vec<StatefulEvent>,
}

impl ComponentWithStateTest {
    fn input_pieces(&self) -> Vec<(f64, Vec<f64>)> {
        self.events.iter().map(|e| (e.time_us, e.input_levels.clone())).collect()
    }
}

impl Test for ComponentWithStateTest {
    fn test_name(&self) -> &str {
        &self.test_name
    }
    fn output_nodes(&self) -> Vec<String> {
        self.output_nodes.clone()
    }
    fn test_length_us(&self) -> f64 {
        self.events.last().map(|e| e.time_us).unwrap_or(0.0) + 5.0
    }
    fn make_component(&self) -> Box<dyn Component> {
        (self.make_component)()
    }
    fn make_input(&self, _component: &dyn Component, config: &SimConfig) -> PiecewiseInputByNode {
        construct_linear_piecewise_input(&self.input_nodes, config.transition_time_us, &self.input_pieces(), config)
    }
    fn check_output(&self, _component: &dyn Component, get_output: &dyn Fn(f64) -> IndexMap<String, f64>) {
        let config = SimConfig::default();
        for event in &self.events {
            if event.expected_outputs.is_empty() {
                continue;
            }
            let check_time_us = event.time_us - 0.05;
            let actual = get_output(check_time_us);
            for (node_name, &expect_high) in &event.expected_outputs {
                let value = actual[node_name];
                assert_logic_level(value, expect_high, &config, || {
                    format!(
                        "{}: incorrect value @ t={check_time_us}us: node={node_name} value={value}",
                        self.test_name
                    )
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_linear_piecewise_input_ramps_between_levels() {
        let config = SimConfig::default();
        let nodes = vec!["a".to_string()];
        let intervals = vec![(0.0, vec![0.0]), (1.0, vec![1.0])];
        let pieces = construct_linear_piecewise_input(&nodes, 0.1, &intervals, &config);
        let a = &pieces["a"];
        assert_eq!(a[0], (0.0, 0.0));
        assert_eq!(a[1], (1.0, 0.0));
        assert_eq!(a[2], (1.1, config.voltage));
    }
}
