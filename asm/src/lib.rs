//! A macro-capable assembler for a 6-bit-word, 18-bit-address machine.
//!
//! Source is parsed into [`value::Value`]s by [`parser::Parser`]: identifiers, numeric literals of
//! a declared word width, label references, inline label declarations, function calls, and
//! captured `{ ... }` code blocks. [`commands`] implements the built-in statements (`DATA`,
//! `DEFINE`, `SET VARIABLE`, `IF`, `LOOP`, `UP`, `INCLUDE`, `ASSERT`, `DEBUG_OUT`) and user-macro
//! invocation over a lexically scoped [`context::Context`] tree. [`Assembler`] collects every
//! placed value and, once parsing finishes, [`Assembler::link_data`] resolves labels into a
//! [`compiled_program::CompiledProgram`] ready for the emulator.
//!
//! Every error surfaced to a caller carries a [`traceback::ProgramTraceback`]: the macro-expansion
//! call chain active at the point of failure, rendered outermost-first.

#![deny(missing_docs)]

mod assembler;
mod commands;
mod compiled_program;
mod context;
mod error;
mod functions;
mod parser;
mod traceback;
mod value;

pub use assembler::Assembler;
pub use compiled_program::{CompiledProgram, CompiledWord, ADDRESS_SPACE};
pub use context::{Context, InstructionMacro};
pub use error::{AssemblyError, LinkTimeError, ParseError};
pub use parser::Parser;
pub use traceback::{Frame, ProgramTraceback};
pub use value::{ResolveError, Value};
