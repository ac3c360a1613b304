use std::collections::BTreeMap;
use std::io::Write;

use dispatch_core::clock::ms_to_secs;
use dispatch_core::record::IncidentRecord;

use crate::metrics::{StationUtilization, ZonalSummary};

fn secs(ms: Option<u64>) -> String {
    ms.map(|ms| ms_to_secs(ms).to_string()).unwrap_or_default()
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `traversed:count` pairs, e.g. `1:12 2:3`.
fn histogram(counts: &BTreeMap<usize, usize>) -> String {
    counts
        .iter()
        .map(|(traversed, count)| format!("{traversed}:{count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn write_incidents_impl<W: Write>(
    records: &[IncidentRecord],
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "seq",
        "incident_type",
        "zone",
        "occurred_at_secs",
        "dispatched_at_secs",
        "service_secs",
        "slot",
        "station",
        "within_standard",
        "traversed",
        "forward_travel_secs",
        "assigned_at_secs",
        "all_on_scene_at_secs",
        "all_returned_at_secs",
    ])?;

    for record in records {
        for slot in &record.slots {
            let outcome = slot.outcome;
            wtr.write_record([
                record.seq.to_string(),
                record.incident_type.to_string(),
                record.zone.to_string(),
                ms_to_secs(record.occurred_at_ms).to_string(),
                ms_to_secs(record.dispatched_at_ms).to_string(),
                ms_to_secs(record.service_ms).to_string(),
                slot.label(),
                optional(outcome.map(|o| o.station)),
                optional(outcome.map(|o| o.within_standard)),
                optional(outcome.map(|o| o.traversed)),
                secs(outcome.map(|o| o.forward_travel_ms)),
                secs(outcome.map(|o| o.assigned_at_ms)),
                secs(record.all_on_scene_at_ms),
                secs(record.all_returned_at_ms),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub(crate) fn write_utilization_impl<W: Write>(
    utilization: &[StationUtilization],
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["station", "vehicle_type", "fleet", "operation_secs", "utilization"])?;
    for row in utilization {
        wtr.write_record([
            row.station.to_string(),
            row.vehicle_type.to_string(),
            row.fleet.to_string(),
            ms_to_secs(row.operation_ms).to_string(),
            optional(row.utilization),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub(crate) fn write_zonal_impl<W: Write>(zonal: &[ZonalSummary], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "zone",
        "incident_type",
        "incidents",
        "covered",
        "coverage",
        "slot",
        "within_standard",
        "beyond_standard",
        "unmet",
        "mean_travel_secs",
        "mean_traversed",
        "traversed_counts",
    ])?;
    for summary in zonal {
        for slot in &summary.slots {
            wtr.write_record([
                summary.zone.to_string(),
                summary.incident_type.to_string(),
                summary.incidents.to_string(),
                summary.covered.to_string(),
                summary.coverage.to_string(),
                slot.slot.clone(),
                slot.within_standard.to_string(),
                slot.beyond_standard.to_string(),
                slot.unmet.to_string(),
                optional(slot.mean_travel_secs),
                optional(slot.mean_traversed),
                histogram(&slot.traversed_counts),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
