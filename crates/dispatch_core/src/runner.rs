//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Each step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule. Only one event is processed at a
//! time, so every change to station availability happens in clock order.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};
use tracing::{info, warn};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::error::ConfigurationError;
use crate::network::{Network, StationAvailability};
use crate::record::IncidentRecord;
use crate::scenario::{build_scenario, ScenarioInputs, ScenarioParams, SimulationEndTimeMs};
use crate::systems::{
    dispatch_search::dispatch_search_system, incident_arrival::incident_arrival_system,
    service_completed::service_completed_system, vehicle_returned::vehicle_returned_system,
    vehicles_on_scene::vehicles_on_scene_system,
};

fn is_incident_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::IncidentArrival)
        .unwrap_or(false)
}

fn is_dispatch_search(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::DispatchStarted | EventKind::CapacityRetry))
        .unwrap_or(false)
}

fn is_vehicles_on_scene(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::VehiclesOnScene)
        .unwrap_or(false)
}

fn is_service_completed(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ServiceCompleted)
        .unwrap_or(false)
}

fn is_vehicle_returned(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::VehicleReturned)
        .unwrap_or(false)
}

/// Pops the next event unless the queue is empty or the event is at or past
/// [SimulationEndTimeMs].
fn pop_due_event(world: &mut World) -> Option<Event> {
    let stop_at = world.get_resource::<SimulationEndTimeMs>().map(|e| e.0);
    let next_ts = world
        .get_resource::<SimulationClock>()
        .and_then(|c| c.next_event_time());
    if let (Some(end_ms), Some(ts)) = (stop_at, next_ts) {
        if ts >= end_ms {
            return None;
        }
    }
    world.get_resource_mut::<SimulationClock>()?.pop_next()
}

/// Runs one simulation step. Returns `false` when nothing was processed.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let Some(event) = pop_due_event(world) else {
        return false;
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let Some(event) = pop_due_event(world) else {
        return false;
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    hook(world, &event);
    true
}

/// Runs simulation steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Runs simulation steps until empty and invokes `hook` after each step.
pub fn run_until_empty_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut hook: F,
) -> usize
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while steps < max_steps && run_next_event_with_hook(world, schedule, &mut hook) {
        steps += 1;
    }
    steps
}

/// One system per event kind, each gated on the current event, followed by
/// [apply_deferred] so spawned and despawned dispatch processes are visible to
/// the next step.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            incident_arrival_system.run_if(is_incident_arrival),
            dispatch_search_system.run_if(is_dispatch_search),
            vehicles_on_scene_system.run_if(is_vehicles_on_scene),
            service_completed_system.run_if(is_service_completed),
            vehicle_returned_system.run_if(is_vehicle_returned),
            apply_deferred,
        )
            .chain(),
    );
    schedule
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Finished incidents in sequence order.
    pub records: Vec<IncidentRecord>,
    /// Station counters when the run stopped.
    pub availability: Vec<StationAvailability>,
    pub end_time_ms: u64,
    pub steps: usize,
    /// Events still queued when the run stopped (end time or step limit).
    pub pending_events: usize,
}

/// Builds a fresh world from `inputs`, runs it to completion and collects the
/// incident records.
pub fn run_scenario(
    inputs: &ScenarioInputs,
    params: ScenarioParams,
) -> Result<SimulationOutcome, ConfigurationError> {
    let mut world = World::new();
    build_scenario(&mut world, inputs, params)?;

    let mut schedule = simulation_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, params.max_steps);

    let (end_time_ms, pending_events) = {
        let clock = world.resource::<SimulationClock>();
        (clock.now(), clock.pending_event_count())
    };
    if pending_events > 0 {
        warn!(
            pending_events,
            steps,
            end_time_ms,
            "simulation stopped with events still queued"
        );
    }

    let mut network = world.resource_mut::<Network>();
    let availability = network.availability();
    let records = network.take_results();
    info!(
        incidents = records.len(),
        steps,
        end_time_ms,
        "simulation finished"
    );

    Ok(SimulationOutcome {
        records,
        availability,
        end_time_ms,
        steps,
        pending_events,
    })
}
