//! Named, runnable test definitions for every gate and latch in this crate.
//!
//! The unit tests beside each gate exercise it via [`crate::test_support`]'s direct
//! settle-and-read harness; this module instead builds the same coverage as
//! [`circuit::tester::Test`] trait objects, named, so a caller outside this crate (a test-harness
//! binary, say) can enumerate and run a subset by name rather than linking `#[cfg(test)]` code.

use crate::{
    AndGate, BufferGate, DLatch, NandGate, NorGate, NotGate, OrGate, SrLatch, TriStateBufferGate,
    XnorGate, XorGate,
};
use circuit::tester::{ComponentWithStateTest, StatefulEvent, StatelessGateTest, Test};
use circuit::Component;
use indexmap::IndexMap;

const GATE_DELAY_US: f64 = 2.0;

fn two_input(
    name: &str,
    make_component: Box<dyn Fn() -> Box<dyn Component>>,
    truth: impl Fn(bool, bool) -> bool + 'static,
) -> Box<dyn Test> {
    Box::new(StatelessGateTest {
        test_name: name.to_string(),
        output_nodes: vec!["out".to_string()],
        input_nodes: vec!["a".to_string(), "b".to_string()],
        expected_gate_delay_us: GATE_DELAY_US,
        make_component,
        expected_output: Box::new(move |bits| vec![truth(bits[0], bits[1])]),
    })
}

fn one_input(
    name: &str,
    make_component: Box<dyn Fn() -> Box<dyn Component>>,
    truth: impl Fn(bool) -> bool + 'static,
) -> Box<dyn Test> {
    Box::new(StatelessGateTest {
        test_name: name.to_string(),
        output_nodes: vec!["out".to_string()],
        input_nodes: vec!["a".to_string()],
        expected_gate_delay_us: GATE_DELAY_US,
        make_component,
        expected_output: Box::new(move |bits| vec![truth(bits[0])]),
    })
}

/// Every named test this crate offers, in a stable order.
pub fn all() -> Vec<Box<dyn Test>> {
    vec![
        two_input(
            "and",
            Box::new(|| -> Box<dyn Component> { Box::new(AndGate::new("and")) }),
            |a, b| a && b,
        ),
        two_input(
            "or",
            Box::new(|| -> Box<dyn Component> { Box::new(OrGate::new("or")) }),
            |a, b| a || b,
        ),
        two_input(
            "nand",
            Box::new(|| -> Box<dyn Component> { Box::new(NandGate::new("nand")) }),
            |a, b| !(a && b),
        ),
        two_input(
            "nor",
            Box::new(|| -> Box<dyn Component> { Box::new(NorGate::new("nor")) }),
            |a, b| !(a || b),
        ),
        two_input(
            "xor",
            Box::new(|| -> Box<dyn Component> { Box::new(XorGate::new("xor")) }),
            |a, b| a ^ b,
        ),
        two_input(
            "xnor",
            Box::new(|| -> Box<dyn Component> { Box::new(XnorGate::new("xnor")) }),
            |a, b| !(a ^ b),
        ),
        one_input("not", Box::new(|| -> Box<dyn Component> { Box::new(NotGate::new("not")) }), |a| !a),
        one_input(
            "buffer",
            Box::new(|| -> Box<dyn Component> { Box::new(BufferGate::new("buffer")) }),
            |a| a,
        ),
        tri_state_buffer(),
        sr_latch(),
        d_latch(),
    ]
}

fn tri_state_buffer() -> Box<dyn Test> {
    // Input order is (input, enable) per `TriStateBufferGate`'s own ports; a disabled output
    // floats weak HIGH rather than going indeterminate, per its doc comment.
    Box::new(StatelessGateTest {
        test_name: "tri_state_buffer".to_string(),
        output_nodes: vec!["out".to_string()],
        input_nodes: vec!["input".to_string(), "enable".to_string()],
        expected_gate_delay_us: GATE_DELAY_US,
        make_component: Box::new(|| -> Box<dyn Component> { Box::new(TriStateBufferGate::new("tsb")) }),
        expected_output: Box::new(|bits| {
            let (input, enable) = (bits[0], bits[1]);
            vec![if enable { input } else { true }]
        }),
    })
}

fn sr_latch() -> Box<dyn Test> {
    Box::new(ComponentWithStateTest {
        test_name: "sr_latch".to_string(),
        output_nodes: vec!["q".to_string()],
        input_nodes: vec!["s".to_string(), "r".to_string()],
        make_component: Box::new(|| -> Box<dyn Component> { Box::new(SrLatch::new("latch")) }),
        events: vec![
            StatefulEvent { time_us: 0.0, expected_outputs: IndexMap::new(), input_levels: vec![1.0, 0.0] },
            StatefulEvent { time_us: 2.0, expected_outputs: IndexMap::new(), input_levels: vec![0.0, 0.0] },
            StatefulEvent {
                time_us: 4.0,
                expected_outputs: IndexMap::from([("q".to_string(), true)]),
                input_levels: vec![0.0, 1.0],
            },
            StatefulEvent {
                time_us: 6.0,
                expected_outputs: IndexMap::from([("q".to_string(), false)]),
                input_levels: vec![0.0, 0.0],
            },
            StatefulEvent {
                time_us: 8.0,
                expected_outputs: IndexMap::from([("q".to_string(), false)]),
                input_levels: vec![0.0, 0.0],
            },
        ],
    })
}

fn d_latch() -> Box<dyn Test> {
    Box::new(ComponentWithStateTest {
        test_name: "d_latch".to_string(),
        output_nodes: vec!["out".to_string()],
        input_nodes: vec!["data".to_string(), "clock".to_string()],
        make_component: Box::new(|| -> Box<dyn Component> { Box::new(DLatch::new("latch")) }),
        events: vec![
            StatefulEvent { time_us: 0.0, expected_outputs: IndexMap::new(), input_levels: vec![1.0, 1.0] },
            StatefulEvent {
                time_us: 2.0,
                expected_outputs: IndexMap::from([("out".to_string(), true)]),
                input_levels: vec![1.0, 1.0],
            },
            StatefulEvent { time_us: 4.0, expected_outputs: IndexMap::new(), input_levels: vec![0.0, 1.0] },
            StatefulEvent {
                time_us: 6.0,
                expected_outputs: IndexMap::from([("out".to_string(), false)]),
                input_levels: vec![0.0, 1.0],
            },
            StatefulEvent { time_us: 8.0, expected_outputs: IndexMap::new(), input_levels: vec![0.0, 0.0] },
            StatefulEvent {
                time_us: 10.0,
                expected_outputs: IndexMap::from([("out".to_string(), false)]),
                input_levels: vec![1.0, 0.0],
            },
            StatefulEvent {
                time_us: 12.0,
                expected_outputs: IndexMap::from([("out".to_string(), false)]),
                input_levels: vec![1.0, 0.0],
            },
        ],
    })
}
