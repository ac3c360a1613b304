//! Resource directory entry: one depot with per-type fleet and live availability.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fleet::{PerVehicle, VehicleType};
use crate::travel_time::NodeId;

/// A station keeps `0 <= available <= fleet` for every vehicle type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    id: NodeId,
    fleet: PerVehicle<u32>,
    available: PerVehicle<u32>,
}

impl Station {
    /// A new station starts with its whole fleet available.
    pub fn new(id: NodeId, fleet: PerVehicle<u32>) -> Self {
        Self {
            id,
            fleet,
            available: fleet,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn fleet(&self, vehicle_type: VehicleType) -> u32 {
        self.fleet[vehicle_type]
    }

    pub fn available(&self, vehicle_type: VehicleType) -> u32 {
        self.available[vehicle_type]
    }

    pub fn hosts(&self, vehicle_type: VehicleType) -> bool {
        self.fleet[vehicle_type] > 0
    }

    pub fn has_available(&self, vehicle_type: VehicleType) -> bool {
        self.available[vehicle_type] > 0
    }

    /// Takes one vehicle out of the pool. Returns `false` if none is available.
    pub fn reserve(&mut self, vehicle_type: VehicleType) -> bool {
        let available = &mut self.available[vehicle_type];
        if *available == 0 {
            return false;
        }
        *available -= 1;
        true
    }

    /// Puts one vehicle back, never exceeding the fleet size.
    /// Returns `false` when the release was clamped.
    pub fn release(&mut self, vehicle_type: VehicleType) -> bool {
        let fleet = self.fleet[vehicle_type];
        let available = &mut self.available[vehicle_type];
        if *available >= fleet {
            warn!(
                station = %self.id,
                %vehicle_type,
                fleet,
                "release ignored: station already has its full fleet"
            );
            return false;
        }
        *available += 1;
        true
    }
}
