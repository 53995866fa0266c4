//! Assembles a `.xasm` source file and drops into an interactive line debugger over it.

use std::io::{stdin, stdout, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use asm::Assembler;
use clap::Parser;
use emu::{Debugger, Emulator};

#[derive(Parser)]
#[command(about = "Assemble a .xasm source file and debug it interactively")]
struct Args {
    /// Path to the primary .xasm source file.
    source: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut assembler = Assembler::new();
    if let Err(e) = assembler.assemble_file(&args.source) {
        eprintln!("{}", e.render());
        return ExitCode::FAILURE;
    }

    let program = match assembler.link_data() {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e.render());
            return ExitCode::FAILURE;
        }
    };

    let mut debugger = Debugger::new(Emulator::new(program));
    let interrupt = debugger.interrupt_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        interrupt.store(true, std::sync::atomic::Ordering::SeqCst);
    }) {
        log::warn!("couldn't install a ctrl-c handler: {e}; `continue` won't be interruptible");
    }

    let mut input = BufReader::new(stdin());
    let mut output = stdout();
    if let Err(e) = debugger.run(&mut input, &mut output) {
        eprintln!("i/o error talking to the terminal: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
