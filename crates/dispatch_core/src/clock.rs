//! Virtual-time event queue.
//!
//! Time is simulated milliseconds. Events with equal timestamps pop in
//! priority order (`Urgent` first) and then in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

pub const ONE_SEC_MS: u64 = 1000;

/// Converts a duration in seconds to whole simulated milliseconds.
/// Negative and non-finite inputs map to zero.
pub fn secs_to_ms(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * ONE_SEC_MS as f64).round() as u64
}

pub fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / ONE_SEC_MS as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// Incident generator wakes up and spawns the next dispatch process.
    IncidentArrival,
    /// A freshly spawned dispatch process runs its resource search.
    DispatchStarted,
    /// A dispatch process re-runs the search for slots it could not fill.
    CapacityRetry,
    /// The slowest assigned vehicle reached the scene.
    VehiclesOnScene,
    /// On-scene service finished; vehicles start heading back.
    ServiceCompleted,
    /// One vehicle reached its home station.
    VehicleReturned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSubject {
    Incident(Entity),
}

/// Urgent events run before normal events at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventPriority {
    Urgent,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub priority: EventPriority,
    /// Insertion sequence; breaks ties so same-instant events stay FIFO.
    pub seq: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being processed by the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedules a normal-priority event at an absolute timestamp.
    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.push(timestamp, EventPriority::Normal, kind, subject);
    }

    /// Suspends for `delay_ms`: the event fires at `now + delay_ms`.
    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, subject: Option<EventSubject>) {
        let timestamp = self.now.saturating_add(delay_ms);
        self.push(timestamp, EventPriority::Normal, kind, subject);
    }

    /// Starts a process at the current instant, ahead of normal events already due now.
    pub fn spawn(&mut self, kind: EventKind, subject: Option<EventSubject>) {
        self.push(self.now, EventPriority::Urgent, kind, subject);
    }

    fn push(
        &mut self,
        timestamp: u64,
        priority: EventPriority,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) {
        debug_assert!(timestamp >= self.now, "event timestamp must be >= current time");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp,
            priority,
            seq,
            kind,
            subject,
        });
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::VehiclesOnScene, None);
        clock.schedule_at(5, EventKind::IncidentArrival, None);
        clock.schedule_at(20, EventKind::VehicleReturned, None);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10);
        assert_eq!(clock.now(), 10);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn same_instant_events_pop_in_insertion_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(7, EventKind::VehicleReturned, None);
        clock.schedule_at(7, EventKind::IncidentArrival, None);
        clock.schedule_at(7, EventKind::ServiceCompleted, None);

        let kinds: Vec<_> = std::iter::from_fn(|| clock.pop_next().map(|e| e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::VehicleReturned,
                EventKind::IncidentArrival,
                EventKind::ServiceCompleted,
            ]
        );
    }

    #[test]
    fn spawn_runs_before_normal_events_due_now() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(3, EventKind::IncidentArrival, None);
        clock.schedule_at(3, EventKind::VehicleReturned, None);
        let arrival = clock.pop_next().expect("arrival");
        assert_eq!(arrival.kind, EventKind::IncidentArrival);

        clock.spawn(EventKind::DispatchStarted, None);
        let next = clock.pop_next().expect("spawned");
        assert_eq!(next.kind, EventKind::DispatchStarted);
        assert_eq!(next.timestamp, 3);
        assert_eq!(clock.pop_next().expect("return").kind, EventKind::VehicleReturned);
    }

    #[test]
    fn schedule_in_is_relative_to_now() {
        let mut clock = SimulationClock::default();
        clock.schedule_in(2 * ONE_SEC_MS, EventKind::IncidentArrival, None);
        clock.pop_next();
        assert_eq!(clock.now(), 2 * ONE_SEC_MS);
        clock.schedule_in(500, EventKind::ServiceCompleted, None);
        assert_eq!(clock.next_event_time(), Some(2_500));
        assert_eq!(clock.pending_event_count(), 1);
    }

    #[test]
    fn seconds_convert_with_rounding() {
        assert_eq!(secs_to_ms(270.0), 270_000);
        assert_eq!(secs_to_ms(0.9 * 300.0), 270_000);
        assert_eq!(secs_to_ms(1.0004), 1_000);
        assert_eq!(secs_to_ms(-3.0), 0);
        assert_eq!(secs_to_ms(f64::NAN), 0);
        assert_eq!(ms_to_secs(1_500), 1.5);
    }

    proptest::proptest! {
        #[test]
        fn pops_are_ordered_by_time_priority_then_insertion(
            entries in proptest::collection::vec((0u64..50, proptest::bool::ANY), 1..40)
        ) {
            let mut clock = SimulationClock::default();
            for (timestamp, urgent) in &entries {
                let priority = if *urgent { EventPriority::Urgent } else { EventPriority::Normal };
                clock.push(*timestamp, priority, EventKind::VehicleReturned, None);
            }

            let popped: Vec<Event> = std::iter::from_fn(|| clock.pop_next()).collect();
            proptest::prop_assert_eq!(popped.len(), entries.len());
            for pair in popped.windows(2) {
                let key = |e: &Event| (e.timestamp, e.priority, e.seq);
                proptest::prop_assert!(key(&pair[0]) < key(&pair[1]));
            }
        }
    }
}
