//! Page controllers.
//!
//! Each page owns the state its screen renders and exposes one method per
//! user event. Front ends call the methods and read back view snapshots;
//! nothing here draws.

pub mod login;
pub mod patients;
