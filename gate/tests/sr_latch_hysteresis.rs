use circuit::tester::{run_in_simulator, ComponentWithStateTest, StatefulEvent};
use circuit::{Component, SimConfig};
use gate::SrLatch;
use indexmap::IndexMap;

/// Set/reset/hold sequence: S=1,R=0 then S=0,R=0 (Q must still be high) then S=0,R=1 (Q goes low)
/// then S=0,R=0 (Q must stay low) — the hysteresis behavior of a cross-coupled NOR latch.
#[test]
fn sr_latch_holds_state_between_pulses() {
    let test = ComponentWithStateTest {
        test_name: "sr_latch_hysteresis".to_string(),
        output_nodes: vec!["q".to_string()],
        input_nodes: vec!["s".to_string(), "r".to_string()],
        make_component: Box::new(|| -> Box<dyn Component> { Box::new(SrLatch::new("latch")) }),
        events: vec![
            StatefulEvent {
                time_us: 0.0,
                expected_outputs: IndexMap::new(),
                input_levels: vec![1.0, 0.0],
            },
            StatefulEvent {
                time_us: 2.0,
                expected_outputs: IndexMap::new(),
                input_levels: vec![0.0, 0.0],
            },
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
    };

    run_in_simulator(&test, &SimConfig::default()).expect("sr latch is fully wired");
}
