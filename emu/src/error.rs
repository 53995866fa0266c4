use asm::ProgramTraceback;
use thiserror::Error;

/// A fatal runtime error: an unknown opcode, or a word accessed under a mode its access flags
/// don't grant. Always reported at the faulting instruction's own traceback, since these are
/// invariant violations the emulator has no recovery path for.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EmulatorError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Where the faulting instruction was placed.
    pub traceback: ProgramTraceback,
}

impl EmulatorError {
    /// Builds a new error anchored at `traceback`.
    pub fn new(message: impl Into<String>, traceback: ProgramTraceback) -> Self {
        EmulatorError { message: message.into(), traceback }
    }

    /// Renders a framed, multi-line report: the message followed by the instruction's call chain.
    pub fn render(&self) -> String {
        format!("emulator error: {}\n{}", self.message, self.traceback.render())
    }
}

/// Something the debugger's prompt loop couldn't make sense of: a malformed command, an address
/// token that doesn't decode, or a label that isn't in the table. Distinct from [`EmulatorError`]
/// since these never come from executing a word — they're operator mistakes at the prompt, not
/// program faults.
#[derive(Debug, Error)]
pub enum DebuggerError {
    /// The typed command doesn't match any of the recognized verbs.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// An address token wasn't a decimal integer, a `:global`/`.local` label, or a `w0,w1,w2`
    /// tuple.
    #[error("can't decode address `{0}`")]
    BadAddress(String),
    /// A `:global`/`.local` label token named something not in the program's label table.
    #[error("no such label `{0}`")]
    UnknownLabel(String),
    /// `.local` was used with no enclosing global label in scope at the current instruction.
    #[error("no enclosing global label for local label `.{0}`")]
    NoEnclosingGlobalLabel(String),
    /// `step`/`continue` ran into a fatal emulator fault.
    #[error(transparent)]
    Emulator(#[from] EmulatorError),
}
