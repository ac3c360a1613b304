//! Incident generator: replays the pending incident list, spawning one
//! dispatch process per incident and then sleeping until the next one.

use bevy_ecs::prelude::{Commands, Res, ResMut};
use tracing::{debug, warn};

use crate::clock::{secs_to_ms, CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::dispatch::Dispatch;
use crate::incident::IncidentTypeTable;
use crate::scenario::PendingIncidents;

pub fn incident_arrival_system(
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    table: Res<IncidentTypeTable>,
    mut pending: ResMut<PendingIncidents>,
) {
    if event.0.kind != EventKind::IncidentArrival {
        return;
    }

    let Some(incident) = pending.0.pop_front() else {
        return;
    };

    match table.required(incident.incident_type) {
        Some(required) => {
            let entity = commands
                .spawn(Dispatch::new(&incident, required, clock.now()))
                .id();
            clock.spawn(EventKind::DispatchStarted, Some(EventSubject::Incident(entity)));
            debug!(incident = incident.seq, zone = %incident.zone, at_ms = clock.now(), "incident arrived");
        }
        None => warn!(
            incident = incident.seq,
            incident_type = incident.incident_type,
            "skipping incident of unknown type"
        ),
    }

    if let Some(next) = pending.0.front() {
        clock.schedule_in(
            secs_to_ms(next.inter_arrival_secs),
            EventKind::IncidentArrival,
            None,
        );
    }
}
