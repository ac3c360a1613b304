use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::dispatch::{Dispatch, DispatchPhase};
use crate::network::Network;
use crate::systems::apply_step;

pub fn service_completed_system(
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    mut network: ResMut<Network>,
    event: Res<CurrentEvent>,
    mut dispatches: Query<&mut Dispatch>,
) {
    if event.0.kind != EventKind::ServiceCompleted {
        return;
    }
    let Some(EventSubject::Incident(entity)) = event.0.subject else {
        return;
    };
    let Ok(mut dispatch) = dispatches.get_mut(entity) else {
        return;
    };
    if dispatch.phase() != DispatchPhase::Servicing {
        return;
    }

    let step = dispatch.service_completed();
    apply_step(&mut commands, &mut clock, &mut network, entity, &dispatch, step);
}
