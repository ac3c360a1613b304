mod support;

use dispatch_core::clock::{EventKind, SimulationClock};
use dispatch_core::dispatch::{CapacityPolicy, Dispatch};
use dispatch_core::fleet::{PerVehicle, VehicleType};
use dispatch_core::incident::IncidentTypeTable;
use dispatch_core::network::Network;
use dispatch_core::runner::run_scenario;
use dispatch_core::scenario::ScenarioParams;
use support::{
    available, built_world, incident, simple_types, two_station_inputs, ScheduleRunner, FAR, NEAR,
    ZONE,
};

#[test]
fn single_t1_incident_within_standard() {
    let inputs = two_station_inputs(PerVehicle::new(1, 0, 0), PerVehicle::default(), vec![incident(1, 1, 0.0, 600.0)])
        .with_incident_types(simple_types());
    let mut world = built_world(&inputs, ScenarioParams::default());

    let mut returned_at = None;
    ScheduleRunner::new().run_full_with_hook(&mut world, |world, event| {
        if event.kind == EventKind::VehicleReturned {
            returned_at = Some(event.timestamp);
            assert_eq!(available(world, NEAR, VehicleType::T1), 1);
        }
    });

    let network = world.resource::<Network>();
    let record = network.result(1).expect("record");
    let slot = record.slot(VehicleType::T1, 1).and_then(|s| s.outcome).expect("t1 slot");
    assert!(slot.within_standard);
    assert_eq!(slot.station, NEAR);
    assert_eq!(slot.traversed, 1);
    assert_eq!(slot.forward_travel_ms, 270_000);
    assert_eq!(record.dispatched_at_ms, 0);
    assert_eq!(record.all_on_scene_at_ms, Some(270_000));
    assert_eq!(record.all_returned_at_ms, Some(270_000 + 600_000 + 270_000));
    assert_eq!(returned_at, Some(1_140_000));
    assert_eq!(world.resource::<SimulationClock>().now(), 1_140_000);
}

#[test]
fn busy_near_station_falls_back_to_far_list() {
    let inputs = two_station_inputs(
        PerVehicle::new(1, 0, 0),
        PerVehicle::new(1, 0, 0),
        vec![incident(1, 1, 0.0, 600.0), incident(2, 1, 10.0, 600.0)],
    )
    .with_incident_types(simple_types());
    let outcome = run_scenario(&inputs, ScenarioParams::default()).expect("run");

    assert_eq!(outcome.records.len(), 2);
    let second = &outcome.records[1];
    let slot = second.slots[0].outcome.expect("second slot");
    assert_eq!(slot.station, FAR);
    assert!(!slot.within_standard);
    assert_eq!(slot.traversed, 1);
    assert_eq!(slot.forward_travel_ms, 630_000);
    assert_eq!(second.dispatched_at_ms, 10_000);
    assert_eq!(second.all_on_scene_at_ms, Some(640_000));
    assert_eq!(second.all_returned_at_ms, Some(640_000 + 600_000 + 630_000));
    assert!(!second.is_covered());

    for station in &outcome.availability {
        assert_eq!(station.available, station.fleet);
    }
}

#[test]
fn exhausted_fleet_flags_the_slot_and_finishes() {
    let inputs = two_station_inputs(
        PerVehicle::new(1, 0, 0),
        PerVehicle::default(),
        vec![incident(1, 1, 0.0, 600.0), incident(2, 1, 10.0, 600.0)],
    )
    .with_incident_types(simple_types());
    let outcome = run_scenario(&inputs, ScenarioParams::default()).expect("run");

    let second = &outcome.records[1];
    assert_eq!(second.unmet_slots(), 1);
    assert!(second.slots[0].outcome.is_none());
    assert_eq!(second.all_on_scene_at_ms, None);
    assert_eq!(second.all_returned_at_ms, None);

    let first = &outcome.records[0];
    assert!(first.is_fully_served());
    assert_eq!(first.all_returned_at_ms, Some(1_140_000));
}

#[test]
fn two_t2_slots_share_a_station_and_return_separately() {
    let inputs = two_station_inputs(PerVehicle::new(0, 2, 0), PerVehicle::default(), vec![incident(1, 2, 0.0, 600.0)])
        .with_incident_types(simple_types());
    let mut world = built_world(&inputs, ScenarioParams::default());
    let mut runner = ScheduleRunner::new();

    assert!(runner.run_one(&mut world), "incident arrival");
    assert_eq!(available(&world, NEAR, VehicleType::T2), 2);
    assert!(runner.run_one(&mut world), "dispatch search");
    assert_eq!(available(&world, NEAR, VehicleType::T2), 0);

    let mut releases = Vec::new();
    runner.run_full_with_hook(&mut world, |world, event| {
        if event.kind == EventKind::VehicleReturned {
            releases.push((event.timestamp, available(world, NEAR, VehicleType::T2)));
        }
    });
    assert_eq!(releases, vec![(1_200_000, 1), (1_200_000, 2)]);

    let record = world.resource::<Network>().result(1).cloned().expect("record");
    assert_eq!(record.arrivals.len(), 2);
    assert_eq!(record.arrival_gaps_ms, vec![0]);
    for slot in &record.slots {
        assert_eq!(slot.outcome.map(|o| o.station), Some(NEAR));
    }
    assert_eq!(world.query::<&Dispatch>().iter(&world).count(), 0);
}

#[test]
fn mixed_type_incident_waits_for_slowest_vehicle() {
    // T3 has a 840s standard, so the 700s station counts as near for it.
    let inputs = two_station_inputs(
        PerVehicle::new(1, 2, 0),
        PerVehicle::new(0, 0, 1),
        vec![incident(1, 3, 0.0, 300.0)],
    )
    .with_incident_types(simple_types());
    let outcome = run_scenario(&inputs, ScenarioParams::default()).expect("run");

    let record = &outcome.records[0];
    let t3 = record.slot(VehicleType::T3, 1).and_then(|s| s.outcome).expect("t3");
    assert_eq!(t3.station, FAR);
    assert!(t3.within_standard);
    assert_eq!(t3.forward_travel_ms, 707_000);
    assert_eq!(record.max_arrival_ms, Some(707_000));
    assert_eq!(record.arrival_gaps_ms, vec![30_000, 0, 407_000]);
    assert_eq!(record.all_on_scene_at_ms, Some(707_000));
    assert_eq!(record.all_returned_at_ms, Some(707_000 + 300_000 + 707_000));
    assert!(record.is_covered());
}

#[test]
fn retry_policy_waits_for_a_returning_vehicle() {
    let inputs = two_station_inputs(
        PerVehicle::new(1, 0, 0),
        PerVehicle::default(),
        vec![incident(1, 1, 0.0, 600.0), incident(2, 1, 10.0, 600.0)],
    )
    .with_incident_types(simple_types());
    let params = ScenarioParams::default()
        .with_capacity_policy(CapacityPolicy::RetryEvery { interval_ms: 60_000 });
    let outcome = run_scenario(&inputs, params).expect("run");

    let second = &outcome.records[1];
    let slot = second.slots[0].outcome.expect("eventually assigned");
    // The first vehicle is home at 1_140_000; the next retry is at 1_150_000.
    assert_eq!(slot.assigned_at_ms, 1_150_000);
    assert_eq!(second.all_on_scene_at_ms, Some(1_420_000));
    assert_eq!(second.response_ms(), Some(1_410_000));
    assert_eq!(second.all_returned_at_ms, Some(1_420_000 + 600_000 + 270_000));
}

#[test]
fn retrying_incidents_never_hold_each_others_vehicles() {
    // Incident 2 can take the only T1 but not both T2 while incident 1 has
    // one out. If it kept that T1, incident 3 could never be served either.
    let types = IncidentTypeTable::new()
        .with_type(4, PerVehicle::new(0, 1, 0))
        .with_type(5, PerVehicle::new(1, 2, 0))
        .with_type(6, PerVehicle::new(1, 1, 0));
    let inputs = two_station_inputs(
        PerVehicle::new(1, 2, 0),
        PerVehicle::default(),
        vec![
            incident(1, 4, 0.0, 600.0),
            incident(2, 5, 0.0, 600.0),
            incident(3, 6, 50.0, 600.0),
        ],
    )
    .with_incident_types(types);
    let params = ScenarioParams::default()
        .with_capacity_policy(CapacityPolicy::RetryEvery { interval_ms: 60_000 })
        .with_max_steps(10_000);
    let outcome = run_scenario(&inputs, params).expect("run");

    assert_eq!(outcome.pending_events, 0);
    assert_eq!(outcome.records.len(), 3);

    // Incident 3 gets the T1 that incident 2 handed back.
    let third = &outcome.records[2];
    assert_eq!(third.dispatched_at_ms, 50_000);
    assert_eq!(third.all_on_scene_at_ms, Some(350_000));
    assert_eq!(third.all_returned_at_ms, Some(1_250_000));

    // Incident 1's T2 is home at 1_200_000 but the T1 only at 1_220_000, so
    // the retry at 1_260_000 is the first to fill all three slots together.
    let second = &outcome.records[1];
    assert!(second.is_fully_served());
    for slot in &second.slots {
        assert_eq!(slot.outcome.map(|o| o.assigned_at_ms), Some(1_260_000));
    }
    assert_eq!(second.all_on_scene_at_ms, Some(1_560_000));
    assert_eq!(second.all_returned_at_ms, Some(1_560_000 + 600_000 + 300_000));

    for station in &outcome.availability {
        assert_eq!(station.available, station.fleet);
    }
}

#[test]
fn end_time_stops_the_run_early() {
    let inputs = two_station_inputs(PerVehicle::new(1, 0, 0), PerVehicle::default(), vec![incident(1, 1, 0.0, 600.0)])
        .with_incident_types(simple_types());
    let outcome = run_scenario(&inputs, ScenarioParams::default().with_simulation_end_time_ms(500_000))
        .expect("run");

    assert_eq!(outcome.steps, 3);
    assert_eq!(outcome.end_time_ms, 270_000);
    assert_eq!(outcome.pending_events, 1);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.availability[0].available, 0);
}

#[test]
fn default_incident_types_need_both_t1_and_t2() {
    let inputs = two_station_inputs(PerVehicle::new(1, 1, 0), PerVehicle::default(), vec![incident(1, 1, 0.0, 60.0)]);
    let outcome = run_scenario(&inputs, ScenarioParams::default()).expect("run");
    let record = &outcome.records[0];
    assert_eq!(record.slots.len(), 2);
    assert_eq!(record.zone, ZONE);
    assert_eq!(record.all_on_scene_at_ms, Some(300_000));
}
