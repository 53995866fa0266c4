use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::emulator::{Emulator, INSTRUCTION_WORDS};
use crate::error::{DebuggerError, EmulatorError};

/// The debugger's own run state, independent of whether the emulator itself is mid-instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Stopped at an instruction boundary, awaiting a command.
    Paused,
    /// About to execute exactly one instruction, then return to `Paused`.
    SingleShot,
    /// Free-running until a breakpoint, a self-jump halt, or an interrupt.
    Running,
}

/// A line-oriented front end over an [`Emulator`]: step/continue/breakpoint/inspect, with
/// addresses decodable as a three-word tuple, a `:global` or `.local` label, or a bare decimal.
pub struct Debugger {
    emulator: Emulator,
    state: RunState,
    breakpoints: Vec<usize>,
    last_command: Option<String>,
    interrupt: Arc<AtomicBool>,
}

impl Debugger {
    /// Wraps an emulator, starting paused with no breakpoints set.
    pub fn new(emulator: Emulator) -> Self {
        Debugger {
            emulator,
            state: RunState::Paused,
            breakpoints: Vec::new(),
            last_command: None,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle the caller can set from a signal handler to request a transition to `Paused` at
    /// the next instruction boundary while `Running`.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// The wrapped emulator.
    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }

    /// The debugger's current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The nearest enclosing global label for the instruction at the current program counter,
    /// used to resolve `.local` address tokens; `None` if the word there carries no traceback
    /// with one (e.g. never placed).
    pub fn current_global_label(&self) -> Option<String> {
        let word = self.emulator.program().data.get(self.emulator.program_counter())?.as_ref()?;
        word.traceback.deepest_non_internal().global_label.clone()
    }

    /// Decodes an address token: a bare decimal, `:global`, `.local` (relative to
    /// [`Self::current_global_label`]), or a `w0,w1,w2` big-endian word tuple.
    pub fn decode_address(&self, token: &str) -> Result<usize, DebuggerError> {
        let token = token.trim();
        if let Some(name) = token.strip_prefix(':') {
            return self
                .emulator
                .program()
                .labels
                .get(name)
                .copied()
                .ok_or_else(|| DebuggerError::UnknownLabel(name.to_string()));
        }
        if let Some(local) = token.strip_prefix('.') {
            let global = self
                .current_global_label()
                .ok_or_else(|| DebuggerError::NoEnclosingGlobalLabel(local.to_string()))?;
            let name = format!("{global}.{local}");
            return self
                .emulator
                .program()
                .labels
                .get(&name)
                .copied()
                .ok_or(DebuggerError::UnknownLabel(name));
        }
        if token.contains(',') {
            let words: Vec<&str> = token.split(',').map(str::trim).collect();
            if words.len() == 3 {
                let mut parsed = [0usize; 3];
                for (i, w) in words.iter().enumerate() {
                    parsed[i] = w.parse().map_err(|_| DebuggerError::BadAddress(token.to_string()))?;
                }
                return Ok(parsed[0] * 64 * 64 + parsed[1] * 64 + parsed[2]);
            }
            return Err(DebuggerError::BadAddress(token.to_string()));
        }
        token.parse().map_err(|_| DebuggerError::BadAddress(token.to_string()))
    }

    /// Every label known to sit at `address`, plus the word's value and access flags, rendered for
    /// the `inspect` command.
    pub fn memory_info(&self, address: usize) -> String {
        let labels = self.emulator.program().address_to_labels.get(&address);
        let label_text = match labels {
            Some(names) if !names.is_empty() => format!(" ({})", names.join(", ")),
            _ => String::new(),
        };
        match self.emulator.program().data.get(address).and_then(Option::as_ref) {
            Some(word) => format!(
                "{address}{label_text}: {} [x={} r={} w={}]",
                word.value, word.for_execution, word.for_reading, word.for_writing
            ),
            None => format!("{address}{label_text}: <unplaced>"),
        }
    }

    /// The full compile-time traceback of the word at `address`, rendered outermost-first.
    pub fn traceback_word(&self, address: usize) -> Option<String> {
        self.emulator
            .program()
            .data
            .get(address)
            .and_then(Option::as_ref)
            .map(|w| w.traceback.render())
    }

    /// Renders the instruction at the current program counter and its full traceback, the `.`
    /// command's output.
    pub fn print_current_instruction(&self) -> String {
        let pc = self.emulator.program_counter();
        let mut lines = vec![format!("pc={pc} a={}", self.emulator.a_register())];
        for offset in 0..INSTRUCTION_WORDS {
            lines.push(self.memory_info(pc + offset));
        }
        if let Some(tb) = self.traceback_word(pc) {
            lines.push(tb);
        }
        lines.join("\n")
    }

    /// Executes one instruction. Returns whether the heuristic self-jump halt fired afterward.
    pub fn run_step(&mut self) -> Result<bool, EmulatorError> {
        self.emulator.step()?;
        Ok(self.emulator.is_self_jump())
    }

    /// Runs until a breakpoint is hit, the self-jump halt heuristic fires, or the interrupt handle
    /// is set; leaves the debugger `Paused` in every case.
    pub fn run_continue(&mut self) -> Result<(), EmulatorError> {
        self.state = RunState::Running;
        loop {
            if self.interrupt.swap(false, Ordering::SeqCst) {
                break;
            }
            let halted = self.run_step()?;
            if halted || self.breakpoints.contains(&self.emulator.program_counter()) {
                break;
            }
        }
        self.state = RunState::Paused;
        Ok(())
    }

    /// Parses and runs one command line (already trimmed of its trailing newline).
    pub fn run_command(&mut self, line: &str) -> Result<Option<String>, DebuggerError> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();

        match verb {
            "step" | "s" => {
                self.run_step()?;
                Ok(Some(self.print_current_instruction()))
            }
            "continue" | "c" => {
                self.run_continue()?;
                Ok(Some(self.print_current_instruction()))
            }
            "breakpoint" | "b" => {
                let token = rest.first().ok_or_else(|| DebuggerError::BadAddress(String::new()))?;
                let address = self.decode_address(token)?;
                self.breakpoints.push(address);
                Ok(Some(format!("breakpoint set at {address}")))
            }
            "inspect" | "i" => {
                let token = rest.first().ok_or_else(|| DebuggerError::BadAddress(String::new()))?;
                let address = self.decode_address(token)?;
                Ok(Some(self.memory_info(address)))
            }
            "." => Ok(Some(self.print_current_instruction())),
            other => Err(DebuggerError::UnknownCommand(other.to_string())),
        }
    }

    /// Reads one command from `input`, repeating the previous command verbatim on an empty line —
    /// debugger ergonomics carried over from the machine this one is modeled after.
    pub fn prompt(&mut self, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<Option<String>> {
        write!(output, "(dbg) ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim().to_string();
        let command = if trimmed.is_empty() {
            self.last_command.clone().unwrap_or_default()
        } else {
            trimmed
        };
        self.last_command = Some(command.clone());
        Ok(Some(command))
    }

    /// The main prompt loop: reads commands from `input` until EOF, printing results/errors to
    /// `output`.
    pub fn run(&mut self, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<()> {
        loop {
            let Some(command) = self.prompt(input, output)? else { return Ok(()) };
            if command.is_empty() {
                continue;
            }
            match self.run_command(&command) {
                Ok(Some(text)) => writeln!(output, "{text}")?,
                Ok(None) => {}
                Err(e) => writeln!(output, "{e}")?,
            }
        }
    }
}
