//! Seeded synthetic incident arrivals for sweeps and benchmarks.
//!
//! Inter-arrival gaps are exponential (a Poisson arrival process); zone and
//! incident type are drawn uniformly, service duration uniformly in a range.

use dispatch_core::incident::{Incident, IncidentTypeId};
use dispatch_core::travel_time::NodeId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticArrivals {
    pub seed: u64,
    pub count: usize,
    /// Mean gap between incidents (seconds).
    pub mean_inter_arrival_secs: f64,
    /// Zones incidents may occur in.
    pub zones: Vec<NodeId>,
    pub incident_types: Vec<IncidentTypeId>,
    pub service_secs_min: f64,
    pub service_secs_max: f64,
    /// Replications to generate; replication `r` uses seed `seed + r`.
    #[serde(default = "default_replications")]
    pub replications: usize,
}

fn default_replications() -> usize {
    1
}

impl SyntheticArrivals {
    /// Generates one incident list. The same seed always yields the same list.
    pub fn generate(&self, seed: u64) -> Vec<Incident> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut occurred_at_secs = 0.0;
        let mut incidents = Vec::with_capacity(self.count);

        for seq in 1..=self.count as u64 {
            let (Some(zone), Some(incident_type)) = (
                self.zones.choose(&mut rng).copied(),
                self.incident_types.choose(&mut rng).copied(),
            ) else {
                break;
            };
            let gap = exponential_secs(&mut rng, self.mean_inter_arrival_secs);
            let service_secs = if self.service_secs_max > self.service_secs_min {
                rng.gen_range(self.service_secs_min..self.service_secs_max)
            } else {
                self.service_secs_min
            };
            occurred_at_secs += gap;
            incidents.push(Incident {
                seq,
                inter_arrival_secs: gap,
                occurred_at_secs,
                incident_type,
                zone,
                service_secs,
            });
        }
        incidents
    }

    /// One incident list per replication.
    pub fn generate_replications(&self) -> Vec<Vec<Incident>> {
        (0..self.replications.max(1) as u64)
            .map(|r| self.generate(self.seed.wrapping_add(r)))
            .collect()
    }
}

/// Sample from exponential: -ln(U) * mean, U uniform in [0, 1) kept off zero.
fn exponential_secs(rng: &mut impl Rng, mean_secs: f64) -> f64 {
    if mean_secs <= 0.0 {
        return 0.0;
    }
    let u: f64 = rng.gen();
    let u = u.max(1e-10);
    -u.ln() * mean_secs
}
