use bevy_ecs::prelude::{Commands, Query, Res, ResMut};
use tracing::error;

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::dispatch::{CapacityPolicy, Dispatch, DispatchPhase, DispatchStep};
use crate::network::Network;
use crate::systems::apply_step;

/// Runs the resource search for a freshly spawned process, or re-runs it for a
/// process waiting on capacity.
pub fn dispatch_search_system(
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    mut network: ResMut<Network>,
    event: Res<CurrentEvent>,
    policy: Option<Res<CapacityPolicy>>,
    mut dispatches: Query<&mut Dispatch>,
) {
    let expected_phase = match event.0.kind {
        EventKind::DispatchStarted => DispatchPhase::Searching,
        EventKind::CapacityRetry => DispatchPhase::AwaitingCapacity,
        _ => return,
    };
    let Some(EventSubject::Incident(entity)) = event.0.subject else {
        return;
    };
    let Ok(mut dispatch) = dispatches.get_mut(entity) else {
        return;
    };
    if dispatch.phase() != expected_phase {
        return;
    }

    let policy = policy.as_deref().copied().unwrap_or_default();
    let now = clock.now();
    let step = match dispatch.search(&mut network, now, policy) {
        Ok(step) => step,
        Err(err) => {
            error!(incident = dispatch.record().seq, %err, "dispatch search failed");
            DispatchStep::Finished
        }
    };
    apply_step(&mut commands, &mut clock, &mut network, entity, &dispatch, step);
}
