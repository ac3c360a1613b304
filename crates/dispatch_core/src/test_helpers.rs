//! Test helpers for common network and scenario setup.

use crate::fleet::PerVehicle;
use crate::incident::Incident;
use crate::network::{Network, StationConfig};
use crate::scenario::ScenarioInputs;
use crate::travel_time::{NodeId, TravelTimeMatrix};
use crate::zone::StandardTravelTimes;

/// Zone without a station used by the single-station fixtures.
pub const TEST_ZONE: NodeId = NodeId(1);

/// The only station of the single-station fixtures.
pub const TEST_STATION: NodeId = NodeId(2);

/// Two-node matrix: [TEST_ZONE] and [TEST_STATION], `travel_secs` apart.
pub fn single_station_matrix(travel_secs: f64) -> TravelTimeMatrix {
    TravelTimeMatrix::new(
        vec![TEST_ZONE, TEST_STATION],
        vec![vec![0.0, travel_secs], vec![travel_secs, 0.0]],
    )
    .expect("single-station matrix should be valid")
}

/// Network with one station hosting `fleet`, `travel_secs` from [TEST_ZONE].
///
/// # Panics
///
/// Panics if `travel_secs` is negative or not finite.
pub fn single_station_network(fleet: PerVehicle<u32>, travel_secs: f64) -> Network {
    Network::build(
        &single_station_matrix(travel_secs),
        &[StationConfig {
            node: TEST_STATION,
            fleet,
        }],
        StandardTravelTimes::default(),
    )
    .expect("single-station network should build")
}

pub fn single_station_inputs(
    fleet: PerVehicle<u32>,
    travel_secs: f64,
    incidents: Vec<Incident>,
) -> ScenarioInputs {
    ScenarioInputs::new(
        single_station_matrix(travel_secs),
        vec![StationConfig {
            node: TEST_STATION,
            fleet,
        }],
        incidents,
    )
}

/// Nodes `1..=nodes` on a line, `step_secs` between neighbours.
pub fn line_matrix(nodes: u32, step_secs: f64) -> TravelTimeMatrix {
    let ids: Vec<NodeId> = (1..=nodes).map(NodeId).collect();
    let rows = ids
        .iter()
        .map(|from| {
            ids.iter()
                .map(|to| f64::from(from.0.abs_diff(to.0)) * step_secs)
                .collect()
        })
        .collect();
    TravelTimeMatrix::new(ids, rows).expect("line matrix should be valid")
}

/// Incident of type `incident_type` in `zone`, arriving `gap_secs` after the
/// previous one.
pub fn incident_at(seq: u64, zone: NodeId, incident_type: u32, gap_secs: f64, service_secs: f64) -> Incident {
    Incident {
        seq,
        inter_arrival_secs: gap_secs,
        occurred_at_secs: 0.0,
        incident_type,
        zone,
        service_secs,
    }
}
