//! Incident input rows and the incident-type → required-vehicles table.

use std::collections::BTreeMap;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::fleet::{PerVehicle, VehicleType};
use crate::travel_time::NodeId;

pub type IncidentTypeId = u32;

/// Required vehicle count per type for one incident type.
pub type RequiredVehicles = PerVehicle<u32>;

/// One incident from the replayed arrival list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Sequence number; the result store is keyed by it.
    pub seq: u64,
    /// Gap since the previous incident (seconds).
    pub inter_arrival_secs: f64,
    /// Recorded occurrence time (seconds since the start of the list).
    pub occurred_at_secs: f64,
    pub incident_type: IncidentTypeId,
    pub zone: NodeId,
    /// On-scene service duration (seconds).
    pub service_secs: f64,
}

/// Static mapping from incident type to required vehicles. Loaded once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Resource)]
pub struct IncidentTypeTable {
    types: BTreeMap<IncidentTypeId, RequiredVehicles>,
}

impl Default for IncidentTypeTable {
    fn default() -> Self {
        Self::new()
            .with_type(1, PerVehicle::new(1, 1, 0))
            .with_type(2, PerVehicle::new(1, 2, 0))
            .with_type(3, PerVehicle::new(1, 2, 1))
    }
}

impl IncidentTypeTable {
    pub fn new() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    pub fn with_type(mut self, id: IncidentTypeId, required: RequiredVehicles) -> Self {
        self.types.insert(id, required);
        self
    }

    pub fn required(&self, id: IncidentTypeId) -> Option<&RequiredVehicles> {
        self.types.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (IncidentTypeId, &RequiredVehicles)> {
        self.types.iter().map(|(id, required)| (*id, required))
    }
}

/// Expands a requirement into `(type, slot number)` pairs in T1, T2, T3 order,
/// slot numbers starting at 1.
pub fn slot_keys(required: &RequiredVehicles) -> Vec<(VehicleType, u32)> {
    required
        .iter()
        .flat_map(|(vehicle_type, count)| (1..=*count).map(move |slot| (vehicle_type, slot)))
        .collect()
}
