pub mod dispatch_search;
pub mod incident_arrival;
pub mod service_completed;
pub mod vehicle_returned;
pub mod vehicles_on_scene;

use bevy_ecs::prelude::{Commands, Entity};

use crate::clock::{EventSubject, SimulationClock};
use crate::dispatch::{Dispatch, DispatchStep};
use crate::network::Network;

/// Suspends the process until its wake-up event, or hands the finished record
/// to the network and despawns the process.
pub(crate) fn apply_step(
    commands: &mut Commands,
    clock: &mut SimulationClock,
    network: &mut Network,
    entity: Entity,
    dispatch: &Dispatch,
    step: DispatchStep,
) {
    match step {
        DispatchStep::Suspend { delay_ms, wake } => {
            clock.schedule_in(delay_ms, wake, Some(EventSubject::Incident(entity)));
        }
        DispatchStep::Finished => {
            network.store_result(dispatch.record().clone());
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod end_to_end_tests {
    use bevy_ecs::prelude::World;

    use crate::clock::{SimulationClock, ONE_SEC_MS};
    use crate::dispatch::Dispatch;
    use crate::fleet::{PerVehicle, VehicleType};
    use crate::incident::Incident;
    use crate::network::Network;
    use crate::runner::{run_until_empty, simulation_schedule};
    use crate::scenario::{build_scenario, ScenarioParams};
    use crate::test_helpers::{single_station_inputs, TEST_STATION, TEST_ZONE};

    fn incident(seq: u64, gap_secs: f64, occurred_at_secs: f64) -> Incident {
        Incident {
            seq,
            inter_arrival_secs: gap_secs,
            occurred_at_secs,
            incident_type: 1,
            zone: TEST_ZONE,
            service_secs: 600.0,
        }
    }

    #[test]
    fn dispatches_one_incident_end_to_end() {
        let inputs = single_station_inputs(PerVehicle::new(1, 1, 0), 300.0, vec![incident(1, 5.0, 5.0)]);
        let mut world = World::new();
        build_scenario(&mut world, &inputs, ScenarioParams::default()).expect("scenario");

        let mut schedule = simulation_schedule();
        let steps = run_until_empty(&mut world, &mut schedule, 1000);
        assert!(steps < 1000, "runner did not converge");

        let network = world.resource::<Network>();
        let record = network.result(1).expect("record");
        let start = 5 * ONE_SEC_MS;
        assert_eq!(record.dispatched_at_ms, start);
        // T1 travels 270s, T2 300s: everyone is on scene after 300s.
        assert_eq!(record.all_on_scene_at_ms, Some(start + 300_000));
        assert_eq!(
            record.all_returned_at_ms,
            Some(start + 300_000 + 600_000 + 300_000)
        );
        let t1 = record.slot(VehicleType::T1, 1).and_then(|s| s.outcome).expect("t1");
        assert_eq!(t1.station, TEST_STATION);
        assert_eq!(t1.forward_travel_ms, 270_000);
        assert!(t1.within_standard);

        let station = network.station(TEST_STATION).expect("station");
        assert_eq!(station.available(VehicleType::T1), 1);
        assert_eq!(station.available(VehicleType::T2), 1);

        let live = world.query::<&Dispatch>().iter(&world).count();
        assert_eq!(live, 0, "finished processes are despawned");
        assert_eq!(
            world.resource::<SimulationClock>().now(),
            start + 1_200_000
        );
    }

    #[test]
    fn overlapping_incidents_share_the_fleet() {
        let inputs = single_station_inputs(
            PerVehicle::new(2, 2, 0),
            300.0,
            vec![incident(1, 0.0, 0.0), incident(2, 10.0, 10.0)],
        );
        let mut world = World::new();
        build_scenario(&mut world, &inputs, ScenarioParams::default()).expect("scenario");

        let mut schedule = simulation_schedule();
        run_until_empty(&mut world, &mut schedule, 1000);

        let network = world.resource::<Network>();
        assert_eq!(network.results().count(), 2);
        for record in network.results() {
            assert!(record.is_fully_served());
            assert_eq!(
                record.all_returned_at_ms,
                Some(record.dispatched_at_ms + 300_000 + 600_000 + 300_000)
            );
        }
        let station = network.station(TEST_STATION).expect("station");
        assert_eq!(station.available(VehicleType::T1), 2);
        assert_eq!(station.available(VehicleType::T2), 2);
    }
}
