//! Discrete-event simulation of an emergency-response fleet: incidents arrive
//! in zones, each one reserves vehicles from the nearest stations, holds them
//! through travel and service, and releases them as they return to base.

pub mod clock;
pub mod dispatch;
pub mod error;
pub mod fleet;
pub mod incident;
pub mod network;
pub mod record;
pub mod runner;
pub mod scenario;
pub mod station;
pub mod systems;
pub mod travel_time;
pub mod zone;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
