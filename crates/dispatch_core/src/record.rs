//! Per-incident outcome records.
//!
//! A record is owned by its dispatch process while it runs and moves into the
//! network's result store once the process is done.

use serde::{Deserialize, Serialize};

use crate::clock::secs_to_ms;
use crate::fleet::VehicleType;
use crate::incident::{IncidentTypeId, Incident};
use crate::travel_time::NodeId;

/// Where one slot's vehicle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOutcome {
    pub station: NodeId,
    /// Zone-to-station travel scaled by the vehicle type's factor. Return
    /// travel takes the same time.
    pub forward_travel_ms: u64,
    /// Chosen from the near list (within the standard travel time).
    pub within_standard: bool,
    /// 1-based position of the chosen station in the list that was scanned.
    pub traversed: usize,
    /// Simulated time the vehicle was reserved.
    pub assigned_at_ms: u64,
}

/// One required vehicle unit. `outcome` stays `None` while no station could
/// supply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub vehicle_type: VehicleType,
    /// Slot number within its vehicle type, starting at 1.
    pub slot: u32,
    pub outcome: Option<SlotOutcome>,
}

impl SlotRecord {
    /// Column-style label, e.g. `t2_2`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.vehicle_type.label(), self.slot)
    }
}

/// One vehicle's trip back to base, keyed by slot rather than by duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLeg {
    pub duration_ms: u64,
    pub station: NodeId,
    pub vehicle_type: VehicleType,
    /// Index into [IncidentRecord::slots].
    pub slot_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub seq: u64,
    pub incident_type: IncidentTypeId,
    pub zone: NodeId,
    pub occurred_at_ms: u64,
    pub service_ms: u64,
    /// Simulated time the dispatch process started.
    pub dispatched_at_ms: u64,
    pub slots: Vec<SlotRecord>,
    /// Satisfied slots ordered by (travel time, slot order).
    pub arrivals: Vec<ReturnLeg>,
    /// Differences between consecutive `arrivals` durations.
    pub arrival_gaps_ms: Vec<u64>,
    pub max_arrival_ms: Option<u64>,
    pub all_on_scene_at_ms: Option<u64>,
    pub all_returned_at_ms: Option<u64>,
}

impl IncidentRecord {
    pub fn new(incident: &Incident, dispatched_at_ms: u64, slots: Vec<SlotRecord>) -> Self {
        Self {
            seq: incident.seq,
            incident_type: incident.incident_type,
            zone: incident.zone,
            occurred_at_ms: secs_to_ms(incident.occurred_at_secs),
            service_ms: secs_to_ms(incident.service_secs),
            dispatched_at_ms,
            slots,
            arrivals: Vec::new(),
            arrival_gaps_ms: Vec::new(),
            max_arrival_ms: None,
            all_on_scene_at_ms: None,
            all_returned_at_ms: None,
        }
    }

    pub fn slot(&self, vehicle_type: VehicleType, slot: u32) -> Option<&SlotRecord> {
        self.slots
            .iter()
            .find(|s| s.vehicle_type == vehicle_type && s.slot == slot)
    }

    pub fn unmet_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.outcome.is_none()).count()
    }

    pub fn is_fully_served(&self) -> bool {
        self.unmet_slots() == 0
    }

    /// Every assigned vehicle came from a station within the standard travel time.
    pub fn is_covered(&self) -> bool {
        self.slots
            .iter()
            .all(|s| s.outcome.is_some_and(|o| o.within_standard))
    }

    /// Fills `arrivals`, `arrival_gaps_ms` and `max_arrival_ms` from the
    /// satisfied slots. Equal durations keep slot order.
    pub fn sequence_arrivals(&mut self) {
        let mut arrivals: Vec<ReturnLeg> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot_index, slot)| {
                slot.outcome.map(|outcome| ReturnLeg {
                    duration_ms: outcome.forward_travel_ms,
                    station: outcome.station,
                    vehicle_type: slot.vehicle_type,
                    slot_index,
                })
            })
            .collect();
        arrivals.sort_by_key(|leg| leg.duration_ms);

        self.arrival_gaps_ms = arrivals
            .windows(2)
            .map(|pair| pair[1].duration_ms - pair[0].duration_ms)
            .collect();
        self.max_arrival_ms = arrivals.last().map(|leg| leg.duration_ms);
        self.arrivals = arrivals;
    }

    /// Simulated time the last vehicle reaches the scene.
    pub fn on_scene_barrier_ms(&self) -> Option<u64> {
        self.slots
            .iter()
            .filter_map(|s| s.outcome)
            .map(|o| o.assigned_at_ms + o.forward_travel_ms)
            .max()
    }

    /// Time from dispatch until every vehicle is on scene.
    pub fn response_ms(&self) -> Option<u64> {
        self.all_on_scene_at_ms
            .map(|at| at.saturating_sub(self.dispatched_at_ms))
    }

    /// Time from the recorded occurrence until every vehicle is on scene.
    pub fn time_to_on_scene_ms(&self) -> Option<u64> {
        self.all_on_scene_at_ms
            .map(|at| at.saturating_sub(self.occurred_at_ms))
    }

    /// Busy time of one slot's vehicle: time until all units are on scene,
    /// the service itself, and the trip back.
    pub fn operation_ms(&self, slot_index: usize) -> Option<u64> {
        let outcome = self.slots.get(slot_index)?.outcome?;
        let to_scene = self.time_to_on_scene_ms()?;
        Some(to_scene + self.service_ms + outcome.forward_travel_ms)
    }
}
