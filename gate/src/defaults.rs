//! Shared electrical constants for the gate library, mirroring `original_source/config.py`'s
//! module-level `VOLTAGE` constant and `discrete_components.py`'s hardcoded 5 kΩ pull-up.

/// Resistance of every gate's NMOS-logic pull-up.
pub const PULL_UP_OHMS: f64 = 5000.0;
/// Logic-HIGH supply voltage driven onto every gate's pull-up rail.
pub const SUPPLY_VOLTS: f64 = 5.0;
