use crate::EquationSystem;
use indexmap::IndexMap;

/// Row/variable naming conventions shared by every stamp function, so devices never hand-format
/// these strings themselves. All times are in microseconds, matching the tester harness.
fn voltage_var(group: usize) -> String {
    format!("v{group}")
}
fn current_row(group: usize) -> String {
    format!("i{group}")
}
fn branch_var(id: &str) -> String {
    format!("b{id}")
}
fn aux_row(id: &str) -> String {
    format!("aux{id}")
}

/// Stamps a resistor between coalesced groups `p` and `n` with resistance `r` ohms.
pub fn stamp_resistor(eq: &mut EquationSystem, p: usize, n: usize, r: f64) {
    let g = 1.0 / r;
    let (vp, vn) = (voltage_var(p), voltage_var(n));
    let (ip, in_) = (current_row(p), current_row(n));
    eq.add_term(&ip, &vp, g);
    eq.add_term(&ip, &vn, -g);
    eq.add_term(&in_, &vp, -g);
    eq.add_term(&in_, &vn, g);
}

/// Stamps a current source injecting `i` amps into group `p` from group `n`.
pub fn stamp_current_source(eq: &mut EquationSystem, p: usize, n: usize, i: f64) {
    eq.add_constant(&current_row(p), -i);
    eq.add_constant(&current_row(n), i);
}

/// Stamps an ideal voltage source `v{p} - v{n} = voltage` between groups `p` and `n`, introducing
/// branch variable `id`.
pub fn stamp_voltage_source(eq: &mut EquationSystem, p: usize, n: usize, voltage: f64, id: &str) {
    let b = branch_var(id);
    eq.add_term(&current_row(p), &b, 1.0);
    eq.add_term(&current_row(n), &b, -1.0);

    let row = aux_row(id);
    eq.add_term(&row, &voltage_var(p), 1.0);
    eq.add_term(&row, &voltage_var(n), -1.0);
    eq.add_constant(&row, voltage);
}

/// Stamps an absolute voltage source `v{p} = voltage` against implicit ground, introducing branch
/// variable `id`. Used directly by [`crate::devices::AbsVoltageSource`] and by the
/// piecewise-linear input hook.
pub fn stamp_abs_voltage(eq: &mut EquationSystem, p: usize, voltage: f64, id: &str) {
    let b = branch_var(id);
    eq.add_term(&current_row(p), &b, 1.0);

    let row = aux_row(id);
    eq.add_term(&row, &voltage_var(p), 1.0);
    eq.add_constant(&row, voltage);
}

/// Stamps a backward-Euler capacitor companion model between groups `a` and `b`.
/// `v_prev` is the voltage across (a, b) recorded on the previous step, taken as `0.0` at `t=0`.
pub fn stamp_capacitor(
    eq: &mut EquationSystem,
    a: usize,
    b: usize,
    capacitance: f64,
    dt: f64,
    id: &str,
    v_prev: f64,
) {
    let branch = branch_var(id);
    eq.add_term(&current_row(a), &branch, 1.0);
    eq.add_term(&current_row(b), &branch, -1.0);

    let g = capacitance / dt;
    let row = aux_row(id);
    eq.add_term(&row, &voltage_var(a), g);
    eq.add_term(&row, &voltage_var(b), -g);
    eq.add_term(&row, &branch, -1.0);
    eq.add_constant(&row, g * v_prev);
}

/// Everything a [`SimulatedDevice`] or pre-step hook needs to know about where the simulation
/// currently stands.
pub struct StepContext<'a> {
    /// Current simulation time, in microseconds.
    pub time: f64,
    /// The timestep about to be taken, in microseconds.
    pub dt: f64,
    prev_voltages: &'a IndexMap<usize, f64>,
}

impl<'a> StepContext<'a> {
    /// The node voltage at `group` as of the previous step, or `0.0` before the first step.
    pub fn prev_voltage(&self, group: usize) -> f64 {
        self.prev_voltages.get(&group).copied().unwrap_or(0.0)
    }

    /// Whether this is the simulation's first step (`t == 0`), used by the MOSFET and capacitor
    /// models' `t=0` special cases.
    pub fn is_first_step(&self) -> bool {
        self.time == 0.0
    }

    /// The previous-step voltage across `(a, b)`, taken as `0.0` at `t=0`. Shared by every device
    /// that owns a capacitive term.
    pub fn prev_voltage_across(&self, a: usize, b: usize) -> f64 {
        if self.is_first_step() {
            0.0
        } else {
            self.prev_voltage(a) - self.prev_voltage(b)
        }
    }
}

/// A stepping object bound to coalesced-group ids, produced by
/// [`AtomicDevice::make_sim_device`](crate::AtomicDevice::make_sim_device).
pub trait SimulatedDevice {
    /// Stamps this device's contribution for the current step into `eq`. `device_id` is this
    /// device's position in traversal order, used to form unique branch-variable/row ids.
    fn step(&mut self, device_id: usize, ctx: &StepContext, eq: &mut EquationSystem);
}

/// Runs once per step, before any device stamps — used to drive time-varying inputs
/// ([`PiecewiseLinearInput`]) into the equation system.
pub trait PreStepHook {
    fn run(&mut self, ctx: &StepContext, eq: &mut EquationSystem);
}

/// Drives a single coalesced group through a piecewise-linear voltage waveform.
///
/// `points` must be sorted by time ascending. Before the first point, reading the hook is a
/// programmer error (the caller started the simulation before its inputs were defined); after the
/// last point, the last value is held indefinitely.
pub struct PiecewiseLinearInput {
    group: usize,
    points: Vec<(f64, f64)>,
    tag: String,
}

impl PiecewiseLinearInput {
    pub fn new(group: usize, points: Vec<(f64, f64)>, tag: impl Into<String>) -> Self {
        assert!(!points.is_empty(), "piecewise-linear input needs at least one point");
        Self {
            group,
            points,
            tag: tag.into(),
        }
    }

    fn value_at(&self, time: f64) -> f64 {
        let first = self.points[0];
        assert!(
            time >= first.0,
            "simulation time {time} precedes this input's first sample at {}",
            first.0
        );

        if let Some(last) = self.points.last() {
            if time >= last.0 {
                return last.1;
            }
        }

        for window in self.points.windows(2) {
            let (t0, v0) = window[0];
            let (t1, v1) = window[1];
            if time >= t0 && time <= t1 {
                if (t1 - t0).abs() < f64::EPSILON {
                    return v1;
                }
                let frac = (time - t0) / (t1 - t0);
                return v0 + frac * (v1 - v0);
            }
        }

        first.1
    }
}

impl PreStepHook for PiecewiseLinearInput {
    fn run(&mut self, ctx: &StepContext, eq: &mut EquationSystem) {
        let value = self.value_at(ctx.time);
        stamp_abs_voltage(eq, self.group, value, &self.tag);
    }
}

/// Drives a component through time via modified nodal analysis.
///
/// Owns every [`SimulatedDevice`] bound from a [`crate::Netlist`], the registered pre-step hooks,
/// and the previous-step voltage per coalesced group needed by capacitor and MOSFET stamps.
pub struct Simulation {
    time: f64,
    devices: Vec<Box<dyn SimulatedDevice>>,
    hooks: Vec<Box<dyn PreStepHook>>,
    prev_voltages: IndexMap<usize, f64>,
    num_groups: usize,
}

impl Simulation {
    pub fn new(devices: Vec<Box<dyn SimulatedDevice>>, num_groups: usize) -> Self {
        Self {
            time: 0.0,
            devices,
            hooks: Vec::new(),
            prev_voltages: IndexMap::new(),
            num_groups,
        }
    }

    /// Registers a pre-step hook, run in registration order at the top of every [`Self::step`].
    pub fn add_pre_step_hook(&mut self, hook: Box<dyn PreStepHook>) {
        self.hooks.push(hook);
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// The node voltage at `group` as of the most recently completed step.
    pub fn voltage(&self, group: usize) -> f64 {
        self.prev_voltages.get(&group).copied().unwrap_or(0.0)
    }

    /// Advances the simulation by one timestep `dt` (microseconds).
    pub fn step(&mut self, dt: f64) {
        let mut eq = EquationSystem::new();

        let ctx = StepContext {
            time: self.time,
            dt,
            prev_voltages: &self.prev_voltages,
        };

        for hook in &mut self.hooks {
            hook.run(&ctx, &mut eq);
        }
        for (device_id, device) in self.devices.iter_mut().enumerate() {
            device.step(device_id, &ctx, &mut eq);
        }

        let solution = eq.solve();
        assert!(
            !solution.approximated,
            "MNA solve degraded to a least-squares approximation at t={}",
            self.time
        );

        let mut next_voltages = IndexMap::new();
        for group in 0..self.num_groups {
            next_voltages.insert(group, solution.get(&voltage_var(group)));
        }
        self.prev_voltages = next_voltages;
        self.time += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedResistor {
        p: usize,
        n: usize,
        r: f64,
    }

    impl SimulatedDevice for FixedResistor {
        fn step(&mut self, _device_id: usize, _ctx: &StepContext, eq: &mut EquationSystem) {
            stamp_resistor(eq, self.p, self.n, self.r);
        }
    }

    struct GroundPin {
        group: usize,
    }

    impl SimulatedDevice for GroundPin {
        fn step(&mut self, device_id: usize, _ctx: &StepContext, eq: &mut EquationSystem) {
            stamp_abs_voltage(eq, self.group, 0.0, &format!("gnd{device_id}"));
        }
    }

    struct SourcePin {
        group: usize,
        volts: f64,
    }

    impl SimulatedDevice for SourcePin {
        fn step(&mut self, device_id: usize, _ctx: &StepContext, eq: &mut EquationSystem) {
            stamp_abs_voltage(eq, self.group, self.volts, &format!("src{device_id}"));
        }
    }

    #[test]
    fn voltage_divider_settles_to_expected_midpoint() {
        // groups: 0 = source (5V), 1 = midpoint, 2 = ground
        let devices: Vec<Box<dyn SimulatedDevice>> = vec![
            Box::new(SourcePin { group: 0, volts: 5.0 }),
            Box::new(GroundPin { group: 2 }),
            Box::new(FixedResistor { p: 0, n: 1, r: 1000.0 }),
            Box::new(FixedResistor { p: 1, n: 2, r: 1000.0 }),
        ];
        let mut sim = Simulation::new(devices, 3);
        sim.step(1.0);
        assert!((sim.voltage(1) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn piecewise_linear_input_interpolates_and_holds() {
        let input = PiecewiseLinearInput::new(0, vec![(0.0, 0.0), (1.0, 5.0)], "in0");
        assert!((input.value_at(0.5) - 2.5).abs() < 1e-9);
        assert_eq!(input.value_at(10.0), 5.0);
    }

    #[test]
    #[should_panic(expected = "precedes")]
    fn piecewise_linear_input_panics_before_first_sample() {
        let input = PiecewiseLinearInput::new(0, vec![(1.0, 0.0)], "in0");
        input.value_at(0.0);
    }
}
