use bevy_ecs::prelude::World;
use tracing::info;

use crate::clock::{secs_to_ms, EventKind, SimulationClock};
use crate::dispatch::CapacityPolicy;
use crate::error::ConfigurationError;
use crate::incident::{Incident, IncidentTypeTable};
use crate::network::Network;
use crate::scenario::params::{PendingIncidents, ScenarioInputs, ScenarioParams, SimulationEndTimeMs};

/// Checks every incident against the network and the type table so the run
/// itself never meets a configuration problem.
pub fn validate_incidents(
    incidents: &[Incident],
    network: &Network,
    incident_types: &IncidentTypeTable,
) -> Result<(), ConfigurationError> {
    let mut previous: Option<u64> = None;
    for incident in incidents {
        if let Some(previous) = previous {
            if incident.seq <= previous {
                return Err(ConfigurationError::OutOfSequence {
                    seq: incident.seq,
                    previous,
                });
            }
        }
        previous = Some(incident.seq);

        for (field, value) in [
            ("inter_arrival_secs", incident.inter_arrival_secs),
            ("occurred_at_secs", incident.occurred_at_secs),
            ("service_secs", incident.service_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidDuration {
                    seq: incident.seq,
                    field,
                    value,
                });
            }
        }

        let required = incident_types.required(incident.incident_type).ok_or(
            ConfigurationError::UnknownIncidentType {
                seq: incident.seq,
                incident_type: incident.incident_type,
            },
        )?;
        let zone = network
            .zone(incident.zone)
            .ok_or(ConfigurationError::UnknownZone(incident.zone))?;
        for (vehicle_type, count) in required.iter() {
            if *count > 0 && !zone.reaches(vehicle_type) {
                return Err(ConfigurationError::UnreachableVehicleType {
                    seq: incident.seq,
                    zone: incident.zone,
                    vehicle_type,
                });
            }
        }
    }
    Ok(())
}

/// A retrying incident waits until all of its slots can be filled at once,
/// so its demand per type must fit the fleet its zone can reach.
fn check_demand_fits_fleet(
    incidents: &[Incident],
    network: &Network,
    incident_types: &IncidentTypeTable,
) -> Result<(), ConfigurationError> {
    for incident in incidents {
        let (Some(required), Some(zone)) = (
            incident_types.required(incident.incident_type),
            network.zone(incident.zone),
        ) else {
            continue;
        };
        for (vehicle_type, count) in required.iter() {
            let fleet: u32 = zone
                .near(vehicle_type)
                .iter()
                .chain(zone.far(vehicle_type))
                .filter_map(|candidate| network.station(candidate.station))
                .map(|station| station.fleet(vehicle_type))
                .sum();
            if *count > fleet {
                return Err(ConfigurationError::InsufficientFleet {
                    seq: incident.seq,
                    zone: incident.zone,
                    vehicle_type,
                    required: *count,
                    fleet,
                });
            }
        }
    }
    Ok(())
}

/// Builds the network, validates the incident list and inserts every
/// resource the schedule needs. The first arrival fires after the first
/// incident's inter-arrival gap.
pub fn build_scenario(
    world: &mut World,
    inputs: &ScenarioInputs,
    params: ScenarioParams,
) -> Result<(), ConfigurationError> {
    let network = Network::build(&inputs.matrix, &inputs.stations, inputs.standards)?;
    validate_incidents(&inputs.incidents, &network, &inputs.incident_types)?;
    if matches!(params.capacity_policy, CapacityPolicy::RetryEvery { .. }) {
        check_demand_fits_fleet(&inputs.incidents, &network, &inputs.incident_types)?;
    }

    let mut clock = SimulationClock::default();
    if let Some(first) = inputs.incidents.first() {
        clock.schedule_at(
            secs_to_ms(first.inter_arrival_secs),
            EventKind::IncidentArrival,
            None,
        );
    }

    info!(
        zones = inputs.matrix.len(),
        stations = inputs.stations.len(),
        incidents = inputs.incidents.len(),
        policy = ?params.capacity_policy,
        "scenario built"
    );

    world.insert_resource(clock);
    world.insert_resource(network);
    world.insert_resource(inputs.incident_types.clone());
    world.insert_resource(params.capacity_policy);
    world.insert_resource(PendingIncidents(inputs.incidents.iter().cloned().collect()));
    if let Some(end_ms) = params.simulation_end_time_ms {
        world.insert_resource(SimulationEndTimeMs(end_ms));
    }
    Ok(())
}
