//! Shared helpers for the `xasm`/`xdbg`/`xtest` command-line tools.
#![deny(missing_docs)]

/// Runs a gate/latch test against an external `ngspice` process.
pub mod spice_runner;
