//! Concrete atomic (and one small composite) devices built on the stamps in
//! [`crate::simulator`].

mod abs_voltage;
mod capacitor;
mod nmos;
mod pullup;
mod resistor;

pub use abs_voltage::AbsVoltageSource;
pub use capacitor::Capacitor;
pub use nmos::NTypeMosfet;
pub use pullup::PullUpResistor;
pub use resistor::Resistor;
