//! Metrics extraction from completed replications: station utilization, zonal
//! summaries per incident type, and a per-replication summary.

use std::collections::BTreeMap;

use dispatch_core::clock::ms_to_secs;
use dispatch_core::fleet::{PerVehicle, VehicleType};
use dispatch_core::incident::IncidentTypeId;
use dispatch_core::network::StationConfig;
use dispatch_core::record::{IncidentRecord, SlotOutcome};
use dispatch_core::travel_time::NodeId;
use dispatch_core::zone::StandardTravelTimes;
use serde::Serialize;

/// Share of simulated time one station's vehicles of one type were busy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationUtilization {
    pub station: NodeId,
    pub vehicle_type: VehicleType,
    pub fleet: u32,
    pub operation_ms: u64,
    /// `None` when the station has no vehicle of this type.
    pub utilization: Option<f64>,
}

/// Operation time per (station, type) divided by `fleet * end_time_ms`.
///
/// A vehicle's operation time runs from the incident's occurrence until all
/// units are on scene, then through service and the trip back.
pub fn station_utilization(
    records: &[IncidentRecord],
    stations: &[StationConfig],
    end_time_ms: u64,
) -> Vec<StationUtilization> {
    let mut operation: BTreeMap<(NodeId, VehicleType), u64> = BTreeMap::new();
    for record in records {
        for (index, slot) in record.slots.iter().enumerate() {
            let (Some(outcome), Some(busy_ms)) = (slot.outcome, record.operation_ms(index)) else {
                continue;
            };
            *operation.entry((outcome.station, slot.vehicle_type)).or_default() += busy_ms;
        }
    }

    stations
        .iter()
        .flat_map(|config| {
            let operation = &operation;
            VehicleType::ALL.into_iter().map(move |vehicle_type| {
                let fleet = config.fleet[vehicle_type];
                let operation_ms = operation
                    .get(&(config.node, vehicle_type))
                    .copied()
                    .unwrap_or(0);
                let utilization = match (fleet, end_time_ms) {
                    (0, _) => None,
                    (_, 0) => Some(0.0),
                    (fleet, end) => Some(operation_ms as f64 / (f64::from(fleet) * end as f64)),
                };
                StationUtilization {
                    station: config.node,
                    vehicle_type,
                    fleet,
                    operation_ms,
                    utilization,
                }
            })
        })
        .collect()
}

/// Scaled forward travel is at most the type's standard travel time.
fn meets_standard(
    outcome: &SlotOutcome,
    vehicle_type: VehicleType,
    standards: &StandardTravelTimes,
) -> bool {
    ms_to_secs(outcome.forward_travel_ms) <= standards.secs(vehicle_type)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    /// Slot label, e.g. `t2_2`.
    pub slot: String,
    pub within_standard: usize,
    pub beyond_standard: usize,
    pub unmet: usize,
    pub mean_travel_secs: Option<f64>,
    pub mean_traversed: Option<f64>,
    /// Served slots by how many candidate stations were scanned to fill them.
    pub traversed_counts: BTreeMap<usize, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonalSummary {
    pub zone: NodeId,
    pub incident_type: IncidentTypeId,
    pub incidents: usize,
    /// Incidents whose every slot met its standard.
    pub covered: usize,
    pub coverage: f64,
    pub slots: Vec<SlotSummary>,
}

#[derive(Default)]
struct SlotAccumulator {
    within: usize,
    beyond: usize,
    unmet: usize,
    travel_secs: f64,
    traversed: usize,
    traversed_counts: BTreeMap<usize, usize>,
}

impl SlotAccumulator {
    fn into_summary(self, slot: String) -> SlotSummary {
        let served = self.within + self.beyond;
        let mean = |total: f64| (served > 0).then(|| total / served as f64);
        SlotSummary {
            slot,
            within_standard: self.within,
            beyond_standard: self.beyond,
            unmet: self.unmet,
            mean_travel_secs: mean(self.travel_secs),
            mean_traversed: mean(self.traversed as f64),
            traversed_counts: self.traversed_counts,
        }
    }
}

/// One summary per (zone, incident type) that saw at least one incident,
/// ordered by zone then type.
pub fn zonal_summaries(records: &[IncidentRecord], standards: &StandardTravelTimes) -> Vec<ZonalSummary> {
    let mut groups: BTreeMap<(NodeId, IncidentTypeId), Vec<&IncidentRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.zone, record.incident_type))
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|((zone, incident_type), records)| {
            let mut slots: BTreeMap<(VehicleType, u32), SlotAccumulator> = BTreeMap::new();
            let mut covered = 0;
            for record in &records {
                let mut all_met = true;
                for slot in &record.slots {
                    let acc = slots.entry((slot.vehicle_type, slot.slot)).or_default();
                    match slot.outcome {
                        Some(outcome) => {
                            if meets_standard(&outcome, slot.vehicle_type, standards) {
                                acc.within += 1;
                            } else {
                                acc.beyond += 1;
                                all_met = false;
                            }
                            acc.travel_secs += ms_to_secs(outcome.forward_travel_ms);
                            acc.traversed += outcome.traversed;
                            *acc.traversed_counts.entry(outcome.traversed).or_default() += 1;
                        }
                        None => {
                            acc.unmet += 1;
                            all_met = false;
                        }
                    }
                }
                if all_met {
                    covered += 1;
                }
            }

            ZonalSummary {
                zone,
                incident_type,
                incidents: records.len(),
                covered,
                coverage: covered as f64 / records.len() as f64,
                slots: slots
                    .into_iter()
                    .map(|((vehicle_type, slot), acc)| {
                        acc.into_summary(format!("{}_{}", vehicle_type.label(), slot))
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Headline numbers for one replication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationSummary {
    pub replication: usize,
    pub incidents: usize,
    pub unmet_slots: usize,
    pub end_time_ms: u64,
    /// Events still queued when the run stopped. Non-zero means the step
    /// limit cut the run short and `incidents` misses unfinished ones.
    pub pending_events: usize,
    /// Mean time from dispatch until all vehicles are on scene.
    pub mean_response_secs: Option<f64>,
    /// Mean utilization over stations that host the type.
    pub mean_utilization: PerVehicle<Option<f64>>,
    /// Share of incidents of each type whose every slot met its standard.
    pub coverage_by_type: BTreeMap<IncidentTypeId, f64>,
}

impl ReplicationSummary {
    /// Every incident ran to completion.
    pub fn is_complete(&self) -> bool {
        self.pending_events == 0
    }
}

pub fn summarize_replication(
    replication: usize,
    records: &[IncidentRecord],
    utilization: &[StationUtilization],
    zonal: &[ZonalSummary],
    end_time_ms: u64,
    pending_events: usize,
) -> ReplicationSummary {
    let responses: Vec<u64> = records.iter().filter_map(|r| r.response_ms()).collect();
    let mean_response_secs = (!responses.is_empty())
        .then(|| ms_to_secs(responses.iter().sum::<u64>()) / responses.len() as f64);

    let mean_utilization = PerVehicle::from_fn(|vehicle_type| {
        let values: Vec<f64> = utilization
            .iter()
            .filter(|u| u.vehicle_type == vehicle_type)
            .filter_map(|u| u.utilization)
            .collect();
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    });

    let mut totals: BTreeMap<IncidentTypeId, (usize, usize)> = BTreeMap::new();
    for summary in zonal {
        let entry = totals.entry(summary.incident_type).or_default();
        entry.0 += summary.covered;
        entry.1 += summary.incidents;
    }
    let coverage_by_type = totals
        .into_iter()
        .map(|(incident_type, (covered, incidents))| {
            (incident_type, covered as f64 / incidents.max(1) as f64)
        })
        .collect();

    ReplicationSummary {
        replication,
        incidents: records.len(),
        unmet_slots: records.iter().map(|r| r.unmet_slots()).sum(),
        end_time_ms,
        pending_events,
        mean_response_secs,
        mean_utilization,
        coverage_by_type,
    }
}
