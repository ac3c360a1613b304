#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use dispatch_core::clock::Event;
use dispatch_core::fleet::PerVehicle;
use dispatch_core::incident::{Incident, IncidentTypeTable};
use dispatch_core::network::{Network, StationConfig};
use dispatch_core::runner::{
    run_next_event, run_until_empty, run_until_empty_with_hook, simulation_schedule,
};
use dispatch_core::scenario::{build_scenario, ScenarioInputs, ScenarioParams};
use dispatch_core::travel_time::{NodeId, TravelTimeMatrix};

/// Zone with no station of its own.
pub const ZONE: NodeId = NodeId(1);
/// Station 300s from [ZONE]: inside every standard.
pub const NEAR: NodeId = NodeId(2);
/// Station 700s from [ZONE]: beyond the T1/T2 standard, inside the T3 one.
pub const FAR: NodeId = NodeId(3);

/// Helper that owns a reusable `Schedule` so tests can step or drain the event queue.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event (returns `true` if an event was processed).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule)
    }

    /// Drive the simulation until the event queue is empty.
    pub fn run_full(&mut self, world: &mut World) -> usize {
        run_until_empty(world, &mut self.schedule, usize::MAX)
    }

    pub fn run_full_with_hook<F>(&mut self, world: &mut World, hook: F) -> usize
    where
        F: FnMut(&World, &Event),
    {
        run_until_empty_with_hook(world, &mut self.schedule, usize::MAX, hook)
    }
}

/// Three nodes: [ZONE], [NEAR] at 300s and [FAR] at 700s.
pub fn two_station_matrix() -> TravelTimeMatrix {
    TravelTimeMatrix::new(
        vec![ZONE, NEAR, FAR],
        vec![
            vec![0.0, 300.0, 700.0],
            vec![300.0, 0.0, 400.0],
            vec![700.0, 400.0, 0.0],
        ],
    )
    .expect("matrix")
}

pub fn two_station_inputs(
    near_fleet: PerVehicle<u32>,
    far_fleet: PerVehicle<u32>,
    incidents: Vec<Incident>,
) -> ScenarioInputs {
    let mut stations = vec![StationConfig {
        node: NEAR,
        fleet: near_fleet,
    }];
    if far_fleet != PerVehicle::default() {
        stations.push(StationConfig {
            node: FAR,
            fleet: far_fleet,
        });
    }
    ScenarioInputs::new(two_station_matrix(), stations, incidents)
}

/// Incident table where type 1 needs a single T1 and type 2 needs two T2.
pub fn simple_types() -> IncidentTypeTable {
    IncidentTypeTable::new()
        .with_type(1, PerVehicle::new(1, 0, 0))
        .with_type(2, PerVehicle::new(0, 2, 0))
        .with_type(3, PerVehicle::new(1, 2, 1))
}

pub fn incident(seq: u64, incident_type: u32, gap_secs: f64, service_secs: f64) -> Incident {
    Incident {
        seq,
        inter_arrival_secs: gap_secs,
        occurred_at_secs: 0.0,
        incident_type,
        zone: ZONE,
        service_secs,
    }
}

pub fn built_world(inputs: &ScenarioInputs, params: ScenarioParams) -> World {
    let mut world = World::new();
    build_scenario(&mut world, inputs, params).expect("scenario");
    world
}

pub fn available(world: &World, station: NodeId, vehicle_type: dispatch_core::fleet::VehicleType) -> u32 {
    world
        .resource::<Network>()
        .station(station)
        .map(|s| s.available(vehicle_type))
        .unwrap_or(0)
}
