//! Run harness for the fleet dispatch simulation.
//!
//! Loads a resource configuration, a travel-time matrix and one incident list
//! per replication, runs the replications in parallel and turns the incident
//! records into station utilization and zonal coverage tables.
//!
//! # Quick Start
//!
//! ```no_run
//! use dispatch_experiments::{export_replications, run_experiment, ExperimentConfig};
//!
//! let config = ExperimentConfig::load("study/experiment.json")?;
//! let results = run_experiment(&config)?;
//! export_replications(&results, &config.output_dir)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! - [`loader`]: CSV inputs
//! - [`synthetic`]: seeded synthetic arrivals
//! - [`runner`]: replications with rayon
//! - [`metrics`]: utilization, zonal and replication summaries
//! - [`export`]: CSV/JSON output

pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod metrics;
pub mod runner;
pub mod synthetic;

pub use config::ExperimentConfig;
pub use error::{ExperimentError, LoadError};
pub use export::export_replications;
pub use runner::{run_experiment, run_parallel_replications, run_replication, ExperimentSetup, ReplicationResult};
