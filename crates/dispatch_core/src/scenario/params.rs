use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::dispatch::CapacityPolicy;
use crate::incident::{Incident, IncidentTypeTable};
use crate::network::StationConfig;
use crate::travel_time::TravelTimeMatrix;
use crate::zone::StandardTravelTimes;

/// Upper bound on processed events for one run.
const DEFAULT_MAX_STEPS: usize = 10_000_000;

/// Simulation end time in milliseconds. When set, the runner stops once the
/// next event would be at or after this timestamp.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEndTimeMs(pub u64);

/// Incidents not yet released by the generator, in sequence order.
#[derive(Debug, Clone, Default, Resource)]
pub struct PendingIncidents(pub VecDeque<Incident>);

/// Everything the simulation reads before it starts.
#[derive(Debug, Clone)]
pub struct ScenarioInputs {
    pub matrix: TravelTimeMatrix,
    pub stations: Vec<StationConfig>,
    pub incidents: Vec<Incident>,
    pub incident_types: IncidentTypeTable,
    pub standards: StandardTravelTimes,
}

impl ScenarioInputs {
    pub fn new(matrix: TravelTimeMatrix, stations: Vec<StationConfig>, incidents: Vec<Incident>) -> Self {
        Self {
            matrix,
            stations,
            incidents,
            incident_types: IncidentTypeTable::default(),
            standards: StandardTravelTimes::default(),
        }
    }

    pub fn with_incident_types(mut self, incident_types: IncidentTypeTable) -> Self {
        self.incident_types = incident_types;
        self
    }

    pub fn with_standards(mut self, standards: StandardTravelTimes) -> Self {
        self.standards = standards;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub capacity_policy: CapacityPolicy,
    pub max_steps: usize,
    /// Stop processing events at or after this time. `None` runs until the
    /// queue drains.
    pub simulation_end_time_ms: Option<u64>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            capacity_policy: CapacityPolicy::default(),
            max_steps: DEFAULT_MAX_STEPS,
            simulation_end_time_ms: None,
        }
    }
}

impl ScenarioParams {
    pub fn with_capacity_policy(mut self, capacity_policy: CapacityPolicy) -> Self {
        self.capacity_policy = capacity_policy;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_simulation_end_time_ms(mut self, end_ms: u64) -> Self {
        self.simulation_end_time_ms = Some(end_ms);
        self
    }
}
