//! Sweep the arrival rate over a synthetic corridor and print coverage.
//!
//! Run with: cargo run -p dispatch_experiments --example synthetic_sweep

use dispatch_core::fleet::PerVehicle;
use dispatch_core::network::StationConfig;
use dispatch_core::test_helpers::line_matrix;
use dispatch_core::travel_time::NodeId;
use dispatch_experiments::synthetic::SyntheticArrivals;
use dispatch_experiments::{run_parallel_replications, ExperimentSetup};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let setup = ExperimentSetup::new(
        line_matrix(20, 80.0),
        vec![
            StationConfig {
                node: NodeId(4),
                fleet: PerVehicle::new(2, 3, 1),
            },
            StationConfig {
                node: NodeId(15),
                fleet: PerVehicle::new(2, 3, 1),
            },
        ],
    );

    for mean_gap_secs in [1200.0, 600.0, 300.0, 150.0] {
        let arrivals = SyntheticArrivals {
            seed: 2024,
            count: 500,
            mean_inter_arrival_secs: mean_gap_secs,
            zones: (1..=20).map(NodeId).collect(),
            incident_types: vec![1, 2, 3],
            service_secs_min: 900.0,
            service_secs_max: 2700.0,
            replications: 8,
        };
        let results = run_parallel_replications(&setup, arrivals.generate_replications(), None, false)?;

        let unmet: usize = results.iter().map(|r| r.summary.unmet_slots).sum();
        let coverage: Vec<String> = [1, 2, 3]
            .iter()
            .map(|incident_type| {
                let values: Vec<f64> = results
                    .iter()
                    .filter_map(|r| r.summary.coverage_by_type.get(incident_type).copied())
                    .collect();
                let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
                format!("e{incident_type}={mean:.2}")
            })
            .collect();
        println!(
            "mean gap {mean_gap_secs:>6.0} s: unmet slots {unmet:>5}, coverage {}",
            coverage.join(" ")
        );
    }
    Ok(())
}
