//! Run a small corridor scenario and print each incident's outcome.
//!
//! Run with: cargo run -p dispatch_core --example scenario_run

use dispatch_core::clock::ms_to_secs;
use dispatch_core::fleet::PerVehicle;
use dispatch_core::incident::Incident;
use dispatch_core::network::StationConfig;
use dispatch_core::runner::run_scenario;
use dispatch_core::scenario::{ScenarioInputs, ScenarioParams};
use dispatch_core::test_helpers::{incident_at, line_matrix};
use dispatch_core::travel_time::NodeId;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const ZONES: u32 = 12;
    const INCIDENTS: u64 = 40;

    let stations = vec![
        StationConfig {
            node: NodeId(3),
            fleet: PerVehicle::new(2, 3, 1),
        },
        StationConfig {
            node: NodeId(10),
            fleet: PerVehicle::new(1, 2, 1),
        },
    ];
    let incidents: Vec<Incident> = (1..=INCIDENTS)
        .map(|seq| {
            incident_at(
                seq,
                NodeId((seq * 7 % u64::from(ZONES)) as u32 + 1),
                (seq % 3 + 1) as u32,
                90.0 + (seq % 5) as f64 * 60.0,
                900.0,
            )
        })
        .collect();

    let inputs = ScenarioInputs::new(line_matrix(ZONES, 75.0), stations, incidents);
    let outcome = run_scenario(&inputs, ScenarioParams::default())?;

    println!("--- Corridor scenario ({ZONES} zones, {INCIDENTS} incidents) ---");
    println!("Steps executed: {}", outcome.steps);
    println!("Simulation time: {:.0} s", ms_to_secs(outcome.end_time_ms));
    for record in &outcome.records {
        let response = record
            .response_ms()
            .map(|ms| format!("{:.0} s", ms_to_secs(ms)))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  #{:<3} type={} zone={:<3} response={:<8} unmet={} covered={}",
            record.seq,
            record.incident_type,
            record.zone,
            response,
            record.unmet_slots(),
            record.is_covered()
        );
    }
    Ok(())
}
