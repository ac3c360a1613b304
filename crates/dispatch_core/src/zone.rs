//! Spatial index: per zone, candidate stations per vehicle type, split at the
//! type's standard travel time and ordered by ascending travel time.
//!
//! Candidate lists are built once before the simulation starts and never
//! change; only station availability does.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::fleet::{PerVehicle, VehicleType};
use crate::station::Station;
use crate::travel_time::{NodeId, TravelTimeMatrix};

const DEFAULT_STANDARD_T1_SECS: f64 = 9.0 * 60.0;
const DEFAULT_STANDARD_T2_SECS: f64 = 9.0 * 60.0;
const DEFAULT_STANDARD_T3_SECS: f64 = 14.0 * 60.0;

/// Per-type threshold (seconds) separating near from far stations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardTravelTimes(pub PerVehicle<f64>);

impl Default for StandardTravelTimes {
    fn default() -> Self {
        Self(PerVehicle::new(
            DEFAULT_STANDARD_T1_SECS,
            DEFAULT_STANDARD_T2_SECS,
            DEFAULT_STANDARD_T3_SECS,
        ))
    }
}

impl StandardTravelTimes {
    pub fn secs(&self, vehicle_type: VehicleType) -> f64 {
        self.0[vehicle_type]
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (vehicle_type, secs) in self.0.iter() {
            if !secs.is_finite() || *secs < 0.0 {
                return Err(ConfigurationError::InvalidStandard {
                    vehicle_type,
                    secs: *secs,
                });
            }
        }
        Ok(())
    }
}

/// A station reachable from a zone, with the raw matrix travel time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub station: NodeId,
    pub travel_secs: f64,
}

#[derive(Debug, Clone)]
pub struct Zone {
    near: PerVehicle<Vec<Candidate>>,
    far: PerVehicle<Vec<Candidate>>,
}

impl Zone {
    /// Builds the index for `id` from its matrix row. Returns `None` if the
    /// node is not in the matrix.
    pub fn build(
        id: NodeId,
        matrix: &TravelTimeMatrix,
        stations: &BTreeMap<NodeId, Station>,
        standards: &StandardTravelTimes,
    ) -> Option<Self> {
        let row: Vec<(NodeId, f64)> = matrix.row(id)?.collect();

        let mut near = PerVehicle::<Vec<Candidate>>::default();
        let mut far = PerVehicle::<Vec<Candidate>>::default();
        for vehicle_type in VehicleType::ALL {
            let threshold = standards.secs(vehicle_type);
            // Column order first; the stable sort keeps it for equal times.
            for (node, secs) in &row {
                let hosts = stations
                    .get(node)
                    .is_some_and(|station| station.hosts(vehicle_type));
                if !hosts {
                    continue;
                }
                let candidate = Candidate {
                    station: *node,
                    travel_secs: *secs,
                };
                if *secs <= threshold {
                    near[vehicle_type].push(candidate);
                } else {
                    far[vehicle_type].push(candidate);
                }
            }
            near[vehicle_type].sort_by(|a, b| a.travel_secs.total_cmp(&b.travel_secs));
            far[vehicle_type].sort_by(|a, b| a.travel_secs.total_cmp(&b.travel_secs));
        }

        Some(Self { near, far })
    }

    /// Stations within the standard travel time, nearest first.
    pub fn near(&self, vehicle_type: VehicleType) -> &[Candidate] {
        &self.near[vehicle_type]
    }

    /// Stations beyond the standard travel time, nearest first.
    pub fn far(&self, vehicle_type: VehicleType) -> &[Candidate] {
        &self.far[vehicle_type]
    }

    /// Whether any station at all can supply this vehicle type.
    pub fn reaches(&self, vehicle_type: VehicleType) -> bool {
        !self.near[vehicle_type].is_empty() || !self.far[vehicle_type].is_empty()
    }
}
