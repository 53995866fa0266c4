//! Assembles a single `.xasm` source file and reports where everything landed.

use std::path::PathBuf;
use std::process::ExitCode;

use asm::Assembler;
use clap::Parser;

#[derive(Parser)]
#[command(about = "Assemble a .xasm source file and print its linked memory layout")]
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

    let mut placed: Vec<usize> =
        program.data.iter().enumerate().filter_map(|(addr, word)| word.as_ref().map(|_| addr)).collect();
    placed.sort_unstable();

    println!("{} words placed", placed.len());
    for address in placed {
        let word = program.data[address].as_ref().unwrap();
        let labels = program.address_to_labels.get(&address);
        match labels {
            Some(names) if !names.is_empty() => {
                println!("{address:>7}: {:>2}  ({})", word.value, names.join(", "));
            }
            _ => println!("{address:>7}: {:>2}", word.value),
        }
    }

    ExitCode::SUCCESS
}
