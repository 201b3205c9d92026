//! Pump controller: actuator flags, system switch and the per-tick control
//! policy.

pub mod controller;
pub mod policy;


pub use controller::PumpController;
pub use policy::ControlPolicy;
