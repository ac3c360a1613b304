//! The network: zones (spatial index), stations (resource directory) and the
//! incident result store. It is the only state shared by dispatch processes.

use std::collections::BTreeMap;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::secs_to_ms;
use crate::error::ConfigurationError;
use crate::fleet::{PerVehicle, VehicleType};
use crate::record::{IncidentRecord, SlotOutcome};
use crate::station::Station;
use crate::travel_time::{NodeId, TravelTimeMatrix};
use crate::zone::{StandardTravelTimes, Zone};

/// A node hosting a station and its fleet per vehicle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    pub node: NodeId,
    pub fleet: PerVehicle<u32>,
}

/// Live counters of one station for one vehicle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationAvailability {
    pub station: NodeId,
    pub vehicle_type: VehicleType,
    pub fleet: u32,
    pub available: u32,
}

#[derive(Debug, Resource)]
pub struct Network {
    zones: BTreeMap<NodeId, Zone>,
    stations: BTreeMap<NodeId, Station>,
    standards: StandardTravelTimes,
    results: BTreeMap<u64, IncidentRecord>,
}

impl Network {
    /// Creates every station, then one zone per matrix node.
    pub fn build(
        matrix: &TravelTimeMatrix,
        station_configs: &[StationConfig],
        standards: StandardTravelTimes,
    ) -> Result<Self, ConfigurationError> {
        standards.validate()?;

        let mut stations = BTreeMap::new();
        for config in station_configs {
            if !matrix.contains(config.node) {
                return Err(ConfigurationError::UnknownZone(config.node));
            }
            if stations
                .insert(config.node, Station::new(config.node, config.fleet))
                .is_some()
            {
                return Err(ConfigurationError::DuplicateNode(config.node));
            }
        }

        let mut zones = BTreeMap::new();
        for node in matrix.nodes() {
            let zone = Zone::build(*node, matrix, &stations, &standards)
                .ok_or(ConfigurationError::UnknownZone(*node))?;
            zones.insert(*node, zone);
        }

        Ok(Self {
            zones,
            stations,
            standards,
            results: BTreeMap::new(),
        })
    }

    pub fn zone(&self, id: NodeId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn station(&self, id: NodeId) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn standards(&self) -> &StandardTravelTimes {
        &self.standards
    }

    /// Reserves the nearest available vehicle of `vehicle_type` for an
    /// incident in `zone`.
    ///
    /// The near list is used when at least one of its stations has a vehicle
    /// free; otherwise the far list is scanned. Returns `Ok(None)` when no
    /// station in either list can supply one.
    pub fn reserve_nearest(
        &mut self,
        zone: NodeId,
        vehicle_type: VehicleType,
        now_ms: u64,
    ) -> Result<Option<SlotOutcome>, ConfigurationError> {
        let zone = self
            .zones
            .get(&zone)
            .ok_or(ConfigurationError::UnknownZone(zone))?;

        let has_free = |id: NodeId| {
            self.stations
                .get(&id)
                .is_some_and(|station| station.has_available(vehicle_type))
        };
        let near = zone.near(vehicle_type);
        let within_standard = near.iter().any(|candidate| has_free(candidate.station));
        let list = if within_standard {
            near
        } else {
            zone.far(vehicle_type)
        };

        for (position, candidate) in list.iter().enumerate() {
            let Some(station) = self.stations.get_mut(&candidate.station) else {
                continue;
            };
            if !station.reserve(vehicle_type) {
                continue;
            }
            return Ok(Some(SlotOutcome {
                station: candidate.station,
                forward_travel_ms: secs_to_ms(
                    candidate.travel_secs * vehicle_type.travel_time_factor(),
                ),
                within_standard,
                traversed: position + 1,
                assigned_at_ms: now_ms,
            }));
        }
        Ok(None)
    }

    /// Returns one vehicle to its station; clamped at the fleet size.
    pub fn release(&mut self, station: NodeId, vehicle_type: VehicleType) -> bool {
        self.stations
            .get_mut(&station)
            .is_some_and(|station| station.release(vehicle_type))
    }

    pub fn store_result(&mut self, record: IncidentRecord) {
        self.results.insert(record.seq, record);
    }

    pub fn result(&self, seq: u64) -> Option<&IncidentRecord> {
        self.results.get(&seq)
    }

    /// Finished incidents in sequence order.
    pub fn results(&self) -> impl Iterator<Item = &IncidentRecord> {
        self.results.values()
    }

    pub fn take_results(&mut self) -> Vec<IncidentRecord> {
        std::mem::take(&mut self.results).into_values().collect()
    }

    /// Live counters for every station and vehicle type it hosts.
    pub fn availability(&self) -> Vec<StationAvailability> {
        self.stations
            .values()
            .flat_map(|station| {
                VehicleType::ALL
                    .into_iter()
                    .filter(move |vehicle_type| station.hosts(*vehicle_type))
                    .map(move |vehicle_type| StationAvailability {
                        station: station.id(),
                        vehicle_type,
                        fleet: station.fleet(vehicle_type),
                        available: station.available(vehicle_type),
                    })
            })
            .collect()
    }
}
