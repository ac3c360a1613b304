use thiserror::Error;

use crate::fleet::VehicleType;
use crate::incident::IncidentTypeId;
use crate::travel_time::NodeId;

/// Invalid inputs detected while building a scenario. Always surfaced before
/// the first event runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("travel-time matrix has {rows} rows for {nodes} nodes")]
    MatrixRowCount { nodes: usize, rows: usize },
    #[error("travel-time row for node {node} has {len} entries, expected {expected}")]
    MatrixRowLength {
        node: NodeId,
        len: usize,
        expected: usize,
    },
    #[error("travel time from {from} to {to} is invalid: {secs}")]
    InvalidTravelTime { from: NodeId, to: NodeId, secs: f64 },
    #[error("node {0} appears more than once")]
    DuplicateNode(NodeId),
    #[error("zone {0} is not part of the network")]
    UnknownZone(NodeId),
    #[error("incident {seq} references unknown incident type {incident_type}")]
    UnknownIncidentType {
        seq: u64,
        incident_type: IncidentTypeId,
    },
    #[error("incident {seq} in zone {zone} requires {vehicle_type} vehicles but no station hosts any")]
    UnreachableVehicleType {
        seq: u64,
        zone: NodeId,
        vehicle_type: VehicleType,
    },
    #[error("incident {seq} is out of sequence (previous was {previous})")]
    OutOfSequence { seq: u64, previous: u64 },
    #[error("incident {seq} has an invalid {field}: {value}")]
    InvalidDuration {
        seq: u64,
        field: &'static str,
        value: f64,
    },
    #[error("incident {seq} in zone {zone} needs {required} {vehicle_type} vehicles but only {fleet} can ever reach it")]
    InsufficientFleet {
        seq: u64,
        zone: NodeId,
        vehicle_type: VehicleType,
        required: u32,
        fleet: u32,
    },
    #[error("standard travel time for {vehicle_type} is invalid: {secs}")]
    InvalidStandard { vehicle_type: VehicleType, secs: f64 },
}
