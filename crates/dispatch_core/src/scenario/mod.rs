//! Scenario setup: validate the inputs, build the network and seed the
//! clock with the first incident arrival.

mod build;
mod params;

pub use build::{build_scenario, validate_incidents};
pub use params::{PendingIncidents, ScenarioInputs, ScenarioParams, SimulationEndTimeMs};
