//! Replication runner: one fresh world per incident list, fanned out with rayon.

use dispatch_core::error::ConfigurationError;
use dispatch_core::incident::{Incident, IncidentTypeTable};
use dispatch_core::network::StationConfig;
use dispatch_core::record::IncidentRecord;
use dispatch_core::runner::run_scenario;
use dispatch_core::scenario::{ScenarioInputs, ScenarioParams};
use dispatch_core::travel_time::TravelTimeMatrix;
use dispatch_core::zone::StandardTravelTimes;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::ExperimentConfig;
use crate::error::ExperimentError;
use crate::loader::{load_incidents, load_stations, load_travel_times};
use crate::metrics::{
    station_utilization, summarize_replication, zonal_summaries, ReplicationSummary,
    StationUtilization, ZonalSummary,
};

/// Inputs shared by every replication of an experiment.
#[derive(Debug, Clone)]
pub struct ExperimentSetup {
    pub matrix: TravelTimeMatrix,
    pub stations: Vec<StationConfig>,
    pub incident_types: IncidentTypeTable,
    pub standards: StandardTravelTimes,
    pub params: ScenarioParams,
}

impl ExperimentSetup {
    pub fn new(matrix: TravelTimeMatrix, stations: Vec<StationConfig>) -> Self {
        Self {
            matrix,
            stations,
            incident_types: IncidentTypeTable::default(),
            standards: StandardTravelTimes::default(),
            params: ScenarioParams::default(),
        }
    }

    pub fn from_config(config: &ExperimentConfig) -> Result<Self, ExperimentError> {
        Ok(Self {
            matrix: load_travel_times(&config.travel_times)?,
            stations: load_stations(&config.stations)?,
            incident_types: config.incident_type_table(),
            standards: config.standards(),
            params: config.scenario_params(),
        })
    }

    fn scenario_inputs(&self, incidents: Vec<Incident>) -> ScenarioInputs {
        ScenarioInputs::new(self.matrix.clone(), self.stations.clone(), incidents)
            .with_incident_types(self.incident_types.clone())
            .with_standards(self.standards)
    }
}

#[derive(Debug, Clone)]
pub struct ReplicationResult {
    pub records: Vec<IncidentRecord>,
    pub utilization: Vec<StationUtilization>,
    pub zonal: Vec<ZonalSummary>,
    pub summary: ReplicationSummary,
}

/// Runs one replication in a fresh world. Nothing is shared with other
/// replications.
///
/// A run cut short by the step limit still returns its finished incidents;
/// `summary.pending_events` tells how much was left.
pub fn run_replication(
    setup: &ExperimentSetup,
    replication: usize,
    incidents: Vec<Incident>,
) -> Result<ReplicationResult, ConfigurationError> {
    let submitted = incidents.len();
    let outcome = run_scenario(&setup.scenario_inputs(incidents), setup.params)?;
    let end_time_ms = outcome.end_time_ms;

    let utilization = station_utilization(&outcome.records, &setup.stations, end_time_ms);
    let zonal = zonal_summaries(&outcome.records, &setup.standards);
    let summary = summarize_replication(
        replication,
        &outcome.records,
        &utilization,
        &zonal,
        end_time_ms,
        outcome.pending_events,
    );
    if !summary.is_complete() {
        warn!(
            replication,
            finished = summary.incidents,
            submitted,
            pending_events = outcome.pending_events,
            "replication stopped before every incident finished"
        );
    }
    info!(
        replication,
        steps = outcome.steps,
        incidents = summary.incidents,
        unmet_slots = summary.unmet_slots,
        end_time_ms,
        "replication finished"
    );

    Ok(ReplicationResult {
        records: outcome.records,
        utilization,
        zonal,
        summary,
    })
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}

/// Runs every incident list as its own replication, in parallel.
///
/// Results come back in input order. `num_threads` pins the pool size;
/// `None` uses rayon's default.
pub fn run_parallel_replications(
    setup: &ExperimentSetup,
    arrivals: Vec<Vec<Incident>>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<ReplicationResult>, ExperimentError> {
    let total = arrivals.len();
    let pb = (show_progress && total > 0).then(|| progress_bar(total));

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    let results = pool.install(|| {
        arrivals
            .into_par_iter()
            .enumerate()
            .map(|(replication, incidents)| {
                let result = run_replication(setup, replication, incidents);
                if let Some(progress_bar) = &pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()
    });

    if let Some(progress_bar) = &pb {
        progress_bar.finish_with_message("Completed");
    }
    Ok(results?)
}

/// Loads everything `config` points at and runs all replications.
pub fn run_experiment(config: &ExperimentConfig) -> Result<Vec<ReplicationResult>, ExperimentError> {
    let setup = ExperimentSetup::from_config(config)?;
    let arrivals = if !config.arrivals.is_empty() {
        config
            .arrivals
            .iter()
            .map(load_incidents)
            .collect::<Result<Vec<_>, _>>()?
    } else if let Some(synthetic) = &config.synthetic {
        synthetic.generate_replications()
    } else {
        return Err(ExperimentError::NoArrivals);
    };

    info!(
        experiment = %config.name,
        replications = arrivals.len(),
        stations = setup.stations.len(),
        zones = setup.matrix.len(),
        "starting experiment"
    );
    run_parallel_replications(&setup, arrivals, config.threads, config.show_progress)
}
