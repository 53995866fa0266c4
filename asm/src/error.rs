use thiserror::Error;

use crate::traceback::ProgramTraceback;

/// A static error raised while parsing, attached to the traceback chain active at the site the
/// error was first observed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// The parser's call chain at the point the error surfaced, if one had been built yet.
    pub traceback: Option<ProgramTraceback>,
}

impl ParseError {
    /// Builds a new error with no traceback attached yet.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), traceback: None }
    }

    /// Attaches a traceback, unless one is already attached (the innermost site wins).
    pub fn with_traceback(mut self, traceback: ProgramTraceback) -> Self {
        if self.traceback.is_none() {
            self.traceback = Some(traceback);
        }
        self
    }

    /// Renders a framed, multi-line report: the message followed by the call chain.
    pub fn render(&self) -> String {
        match &self.traceback {
            Some(tb) => format!("parse error: {}\n{}", self.message, tb.render()),
            None => format!("parse error: {}", self.message),
        }
    }
}

/// An error raised during the link pass: an unresolved label, or a malformed placed value.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LinkTimeError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// The traceback of the value that failed to resolve — its own recorded traceback if it has
    /// one (as labels do, pointing at the reference site), otherwise the `DATA` site that placed
    /// it.
    pub traceback: ProgramTraceback,
}

impl LinkTimeError {
    /// Builds a new link-time error anchored at `traceback`.
    pub fn new(message: impl Into<String>, traceback: ProgramTraceback) -> Self {
        Self { message: message.into(), traceback }
    }

    /// Renders a framed, multi-line report: the message followed by the call chain.
    pub fn render(&self) -> String {
        format!("link error: {}\n{}", self.message, self.traceback.render())
    }
}

/// The tagged union of the two kinds of failure the assembler can surface; the only error type
/// crossing the assembler's public boundary.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Failed during parsing.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Failed during the link pass.
    #[error(transparent)]
    Link(#[from] LinkTimeError),
}

impl AssemblyError {
    /// Renders a framed, multi-line report suitable for a CLI's error boundary.
    pub fn render(&self) -> String {
        match self {
            AssemblyError::Parse(e) => e.render(),
            AssemblyError::Link(e) => e.render(),
        }
    }
}
