/// Global simulation constants, gathered into one struct rather than module-level constants so
/// tests can exercise alternate voltage/timing regimes without a process-wide singleton.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// The supply/logic-HIGH voltage driven by the tester harness (nominally 5 V).
    pub voltage: f64,
    /// Threshold above which a measured voltage counts as logic HIGH.
    pub high_threshold: f64,
    /// Threshold below which a measured voltage counts as logic LOW.
    pub low_threshold: f64,
    /// Default rise/fall time used when synthesizing piecewise-linear input ramps, in
    /// microseconds.
    pub transition_time_us: f64,
    /// Default simulation timestep, in microseconds — the same unit the tester harness uses for
    /// waveform timestamps, so `Simulation::time` and input breakpoints never need conversion.
    pub timestep_us: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            voltage: 5.0,
            high_threshold: 4.7,
            low_threshold: 0.3,
            transition_time_us: 0.1,
            timestep_us: 0.001,
        }
    }
}
