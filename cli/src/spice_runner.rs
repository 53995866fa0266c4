//! Runs a [`circuit::tester::Test`] against an external `ngspice` process instead of the
//! in-process [`circuit::Simulation`], per [`circuit::spice`]'s doc comment that launching the
//! subprocess itself is this crate's job, not the library's.

use std::process::Command;

use circuit::spice::{find_output_at_time, make_spice_script, parse_spice_output, SpiceError};
use circuit::tester::Test;
use circuit::{CircuitError, Netlist, Node, SimConfig};
use std::rc::Rc;
use thiserror::Error;

/// Everything that can go wrong running a test against `ngspice` instead of the built-in
/// simulator.
#[derive(Debug, Error)]
pub enum SpiceRunError {
    /// Building the component tree into a flat netlist failed.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    /// Couldn't spawn `ngspice`, or it exited non-zero.
    #[error("ngspice failed to run: {0}")]
    Process(String),
    /// `ngspice`'s batch output didn't parse.
    #[error(transparent)]
    Spice(#[from] SpiceError),
    /// Writing the generated `.cir` script to a temp file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Builds `test`'s component, renders an ngspice script for it, runs `ngspice -b` over it, and
/// feeds the parsed batch output through `test.check_output`. Requires `ngspice` on `PATH`.
pub fn run_spice_test(test: &dyn Test, config: &SimConfig) -> Result<(), SpiceRunError> {
    let component = test.make_component();
    let netlist = Netlist::build(component.as_ref())?;
    let ports = component.ports();

    let inputs_by_name = test.make_input(component.as_ref(), config);
    let inputs: Vec<(Rc<Node>, Vec<(f64, f64)>)> = inputs_by_name
        .iter()
        .map(|(name, points)| {
            let node = ports
                .get(name)
                .unwrap_or_else(|| panic!("test input port `{name}` does not exist"));
            (node.clone(), points.clone())
        })
        .collect();

    let output_names = test.output_nodes();
    let output_nodes: Vec<Rc<Node>> = output_names
        .iter()
        .map(|name| {
            ports.get(name).cloned().unwrap_or_else(|| panic!("test output port `{name}` does not exist"))
        })
        .collect();

    let script = make_spice_script(
        test.test_name(),
        &netlist,
        &inputs,
        &output_nodes,
        config.voltage,
        &format!("{}us", config.timestep_us),
        &format!("{}us", test.test_length_us()),
    );

    let cir_path = std::env::temp_dir().join(format!("xtest_{}.cir", test.test_name()));
    std::fs::write(&cir_path, script)?;

    let output = Command::new("ngspice")
        .arg("-b")
        .arg(&cir_path)
        .output()
        .map_err(|e| SpiceRunError::Process(e.to_string()))?;
    if !output.status.success() {
        return Err(SpiceRunError::Process(String::from_utf8_lossy(&output.stderr).into_owned()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let samples = parse_spice_output(&stdout, output_names.len())?;

    let get_output = move |time_us: f64| -> indexmap::IndexMap<String, f64> {
        let requested_s = time_us * 1e-6;
        find_output_at_time(&samples, &output_names, requested_s)
            .unwrap_or_else(|e| panic!("{}: {e}", test.test_name()))
    };

    test.check_output(component.as_ref(), &get_output);
    Ok(())
}
