//! JSON experiment configuration.

use std::fs;
use std::path::{Path, PathBuf};

use dispatch_core::dispatch::CapacityPolicy;
use dispatch_core::fleet::PerVehicle;
use dispatch_core::incident::{IncidentTypeId, IncidentTypeTable, RequiredVehicles};
use dispatch_core::scenario::ScenarioParams;
use dispatch_core::zone::StandardTravelTimes;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::synthetic::SyntheticArrivals;

const DEFAULT_OUTPUT_DIR: &str = "dispatch-output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentTypeConfig {
    pub id: IncidentTypeId,
    pub required: RequiredVehicles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub name: String,
    /// Resource configuration CSV (`zone, station, t1, t2, t3`).
    pub stations: PathBuf,
    /// Travel-time matrix CSV.
    pub travel_times: PathBuf,
    /// One incident CSV per replication.
    pub arrivals: Vec<PathBuf>,
    /// Generated arrivals, used when `arrivals` is empty.
    pub synthetic: Option<SyntheticArrivals>,
    /// Standard travel times in seconds.
    pub standards: PerVehicle<f64>,
    /// Empty means the default three incident types.
    pub incident_types: Vec<IncidentTypeConfig>,
    pub capacity_policy: CapacityPolicy,
    pub threads: Option<usize>,
    pub output_dir: PathBuf,
    pub show_progress: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: "dispatch".to_string(),
            stations: PathBuf::from("data/config.csv"),
            travel_times: PathBuf::from("data/od.csv"),
            arrivals: Vec::new(),
            synthetic: None,
            standards: StandardTravelTimes::default().0,
            incident_types: Vec::new(),
            capacity_policy: CapacityPolicy::default(),
            threads: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            show_progress: true,
        }
    }
}

impl ExperimentConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&text).map_err(|source| LoadError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.resolve_paths(path.parent().unwrap_or(Path::new("")));
        Ok(config)
    }

    /// Makes relative input paths relative to the config file's directory.
    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.stations);
        resolve(&mut self.travel_times);
        self.arrivals.iter_mut().for_each(resolve);
    }

    pub fn standards(&self) -> StandardTravelTimes {
        StandardTravelTimes(self.standards)
    }

    pub fn incident_type_table(&self) -> IncidentTypeTable {
        if self.incident_types.is_empty() {
            return IncidentTypeTable::default();
        }
        self.incident_types
            .iter()
            .fold(IncidentTypeTable::new(), |table, entry| {
                table.with_type(entry.id, entry.required)
            })
    }

    pub fn scenario_params(&self) -> ScenarioParams {
        ScenarioParams::default().with_capacity_policy(self.capacity_policy)
    }
}
