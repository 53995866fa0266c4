//! Runs the named component test suite, against the in-process simulator, `ngspice`, or both.

use std::io::{stdin, BufRead};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::process::ExitCode;

use circuit::tester::{run_in_simulator, Test};
use circuit::{Netlist, SimConfig};
use cli::spice_runner::run_spice_test;
use clap::Parser;

/// A test name this harness will never select unless named explicitly: a scratch scenario left
/// running during development, excluded from the default "run everything" sweep.
const SCRATCH_TEST: &str = "temp";

#[derive(Parser)]
#[command(about = "Run the gate/latch test suite against the simulator and/or ngspice")]
struct Args {
    /// Print progress for every test, not just failures.
    #[arg(short, long)]
    verbose: bool,

    /// Pause for Enter between tests.
    #[arg(short, long)]
    interactive: bool,

    /// Print each test's flattened netlist instead of running it.
    #[arg(short, long)]
    netlist: bool,

    /// Run against ngspice.
    #[arg(long)]
    spice: bool,

    /// Run against the in-process simulator.
    #[arg(long)]
    sim: bool,

    /// Test names to run; if none are given, every test except `temp` runs.
    tests: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let registry = gate::registry::all();
    let run_all = args.tests.is_empty();
    let selected: Vec<String> = if run_all {
        registry.iter().map(|t| t.test_name().to_string()).filter(|n| n != SCRATCH_TEST).collect()
    } else {
        args.tests.clone()
    };

    let (want_sim, want_spice) = match (args.sim, args.spice) {
        (false, false) => (true, true),
        (s, p) => (s, p),
    };

    let mut failures = 0usize;
    for name in &selected {
        let Some(test) = registry.iter().find(|t| t.test_name() == name) else {
            eprintln!("no such test: `{name}`");
            failures += 1;
            continue;
        };
        let test = test.as_ref();

        if args.netlist {
            let component = test.make_component();
            match Netlist::build(component.as_ref()) {
                Ok(netlist) => println!("{}:\n{}", test.test_name(), netlist.dump()),
                Err(e) => {
                    eprintln!("{}: can't build netlist: {e}", test.test_name());
                    failures += 1;
                }
            }
            continue;
        }

        let run_spice_here = want_spice && !(run_all && name.starts_with("slow"));

        if want_sim {
            if args.verbose {
                println!("{}: running against the simulator", test.test_name());
            }
            if run_one(test, Mode::Sim, args.verbose) {
                failures += 1;
            }
        }
        if run_spice_here {
            if args.verbose {
                println!("{}: running against ngspice", test.test_name());
            }
            if run_one(test, Mode::Spice, args.verbose) {
                failures += 1;
            }
        }

        if args.interactive {
            println!("press enter to continue...");
            let mut line = String::new();
            let _ = stdin().lock().read_line(&mut line);
        }
    }

    println!("{} test(s), {failures} failure(s)", selected.len());
    if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

enum Mode {
    Sim,
    Spice,
}

/// Runs one test under one backend, catching the panic a failed assertion raises so the rest of
/// the suite still runs. Returns whether it failed.
fn run_one(test: &dyn Test, mode: Mode, verbose: bool) -> bool {
    let config = SimConfig::default();
    let result = catch_unwind(AssertUnwindSafe(|| match mode {
        Mode::Sim => run_in_simulator(test, &config).unwrap_or_else(|e| panic!("{e}")),
        Mode::Spice => run_spice_test(test, &config).unwrap_or_else(|e| panic!("{e}")),
    }));

    match result {
        Ok(()) => {
            if verbose {
                println!("{}: ok", test.test_name());
            }
            false
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "test panicked with a non-string payload".to_string());
            println!("{}: FAILED: {message}", test.test_name());
            true
        }
    }
}
