//! Executes an `asm`-linked [`asm::CompiledProgram`] and offers a line debugger over it.
//!
//! [`Emulator`] holds the architectural registers and steps one instruction at a time, decoding
//! the 6-bit opcode as a bit-test cascade exactly mirroring the machine's instruction table.
//! [`Debugger`] wraps an `Emulator` with a `step`/`continue`/`breakpoint`/`inspect`/`.` prompt
//! loop, decoding addresses as a three-word tuple, a `:global`/`.local` label, or a bare decimal,
//! and applying the heuristic self-jump halt detection (there is no architectural HLT).

#![deny(missing_docs)]

mod debugger;
mod emulator;
mod error;

pub use debugger::{Debugger, RunState};
pub use emulator::{Emulator, OutputItem, INSTRUCTION_WORDS, STRING_CHARS};
pub use error::{DebuggerError, EmulatorError};
