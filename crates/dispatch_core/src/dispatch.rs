//! Per-incident dispatch state machine.
//!
//! `Searching -> WaitingForArrival -> Servicing -> WaitingForReturn -> Done`,
//! with `AwaitingCapacity` between searches when the capacity policy retries.
//! A retrying process holds no vehicles while it waits.
//! Every transition returns a [DispatchStep] telling the caller how long the
//! process suspends and which event wakes it.

use bevy_ecs::prelude::{Component, Resource};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::EventKind;
use crate::error::ConfigurationError;
use crate::incident::{slot_keys, Incident, RequiredVehicles};
use crate::network::Network;
use crate::record::{IncidentRecord, SlotRecord};

/// What happens to a slot no station can currently supply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Resource)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Leave the slot unfilled, log it, and carry on with the filled slots.
    #[default]
    SkipAndFlag,
    /// Fill every slot or none: a search that leaves any slot open hands its
    /// reservations back and runs again after `interval_ms`.
    RetryEvery { interval_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Searching,
    AwaitingCapacity,
    WaitingForArrival,
    Servicing,
    WaitingForReturn,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStep {
    Suspend { delay_ms: u64, wake: EventKind },
    Finished,
}

#[derive(Debug, Clone, Component)]
pub struct Dispatch {
    phase: DispatchPhase,
    record: IncidentRecord,
    next_return: usize,
}

impl Dispatch {
    pub fn new(incident: &Incident, required: &RequiredVehicles, now_ms: u64) -> Self {
        let slots = slot_keys(required)
            .into_iter()
            .map(|(vehicle_type, slot)| SlotRecord {
                vehicle_type,
                slot,
                outcome: None,
            })
            .collect();
        Self {
            phase: DispatchPhase::Searching,
            record: IncidentRecord::new(incident, now_ms, slots),
            next_return: 0,
        }
    }

    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    pub fn record(&self) -> &IncidentRecord {
        &self.record
    }

    /// Fills every open slot in slot order, re-reading availability before
    /// each one. No simulated time passes.
    ///
    /// Under [CapacityPolicy::RetryEvery] a partly filled search releases what
    /// it reserved before suspending, so two waiting incidents can never hold
    /// each other's vehicles.
    pub fn search(
        &mut self,
        network: &mut Network,
        now_ms: u64,
        policy: CapacityPolicy,
    ) -> Result<DispatchStep, ConfigurationError> {
        let retrying = self.phase == DispatchPhase::AwaitingCapacity;
        let zone = self.record.zone;
        let seq = self.record.seq;

        for slot in self.record.slots.iter_mut().filter(|s| s.outcome.is_none()) {
            slot.outcome = network.reserve_nearest(zone, slot.vehicle_type, now_ms)?;
            match slot.outcome {
                Some(outcome) => debug!(
                    incident = seq,
                    slot = %slot.label(),
                    station = %outcome.station,
                    travel_ms = outcome.forward_travel_ms,
                    within_standard = outcome.within_standard,
                    "vehicle reserved"
                ),
                None if retrying => debug!(incident = seq, slot = %slot.label(), "still no vehicle available"),
                None => warn!(
                    incident = seq,
                    zone = %zone,
                    slot = %slot.label(),
                    "capacity exhausted: no station can supply this vehicle"
                ),
            }
        }

        if let CapacityPolicy::RetryEvery { interval_ms } = policy {
            if !self.record.is_fully_served() {
                let released = self.release_reservations(network);
                if released > 0 {
                    debug!(incident = seq, released, "partial reservation handed back until every slot can be filled");
                }
                self.phase = DispatchPhase::AwaitingCapacity;
                return Ok(DispatchStep::Suspend {
                    delay_ms: interval_ms,
                    wake: EventKind::CapacityRetry,
                });
            }
        }

        self.record.sequence_arrivals();
        if self.record.arrival_gaps_ms.contains(&0) {
            debug!(incident = seq, "several vehicles share a travel time; each is released on its own");
        }

        match self.record.on_scene_barrier_ms() {
            Some(barrier) => {
                self.phase = DispatchPhase::WaitingForArrival;
                Ok(DispatchStep::Suspend {
                    delay_ms: barrier.saturating_sub(now_ms),
                    wake: EventKind::VehiclesOnScene,
                })
            }
            None => {
                warn!(incident = seq, "no vehicle could be dispatched");
                self.phase = DispatchPhase::Done;
                Ok(DispatchStep::Finished)
            }
        }
    }

    fn release_reservations(&mut self, network: &mut Network) -> usize {
        let mut released = 0;
        for slot in &mut self.record.slots {
            if let Some(outcome) = slot.outcome.take() {
                network.release(outcome.station, slot.vehicle_type);
                released += 1;
            }
        }
        released
    }

    pub fn vehicles_on_scene(&mut self, now_ms: u64) -> DispatchStep {
        self.record.all_on_scene_at_ms = Some(now_ms);
        self.phase = DispatchPhase::Servicing;
        debug!(incident = self.record.seq, at_ms = now_ms, "all vehicles on scene");
        DispatchStep::Suspend {
            delay_ms: self.record.service_ms,
            wake: EventKind::ServiceCompleted,
        }
    }

    pub fn service_completed(&mut self) -> DispatchStep {
        self.phase = DispatchPhase::WaitingForReturn;
        self.next_return = 0;
        match self.record.arrivals.first() {
            Some(leg) => DispatchStep::Suspend {
                delay_ms: leg.duration_ms,
                wake: EventKind::VehicleReturned,
            },
            None => {
                self.phase = DispatchPhase::Done;
                DispatchStep::Finished
            }
        }
    }

    /// Releases the next vehicle in return order and waits for the one after it.
    pub fn vehicle_returned(&mut self, network: &mut Network, now_ms: u64) -> DispatchStep {
        if let Some(leg) = self.record.arrivals.get(self.next_return) {
            network.release(leg.station, leg.vehicle_type);
            debug!(
                incident = self.record.seq,
                station = %leg.station,
                vehicle_type = %leg.vehicle_type,
                at_ms = now_ms,
                "vehicle back at station"
            );
        }
        self.next_return += 1;

        if let Some(gap) = self.record.arrival_gaps_ms.get(self.next_return - 1) {
            return DispatchStep::Suspend {
                delay_ms: *gap,
                wake: EventKind::VehicleReturned,
            };
        }

        self.record.all_returned_at_ms = Some(now_ms);
        self.phase = DispatchPhase::Done;
        DispatchStep::Finished
    }

}
