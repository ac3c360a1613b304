//! Result export: per-slot incident rows, station utilization and zonal
//! summaries as CSV, replication summaries as JSON.
//!
//! Output is a pure function of the results; exporting the same results twice
//! produces identical files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use dispatch_core::record::IncidentRecord;
use tracing::info;

use crate::error::ExperimentError;
use crate::metrics::{ReplicationSummary, StationUtilization, ZonalSummary};
use crate::runner::ReplicationResult;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;

/// One row per incident slot; unmet slots leave the outcome columns empty.
pub fn write_incidents_csv<W: Write>(records: &[IncidentRecord], writer: W) -> Result<(), ExperimentError> {
    csv::write_incidents_impl(records, writer)?;
    Ok(())
}

pub fn write_utilization_csv<W: Write>(
    utilization: &[StationUtilization],
    writer: W,
) -> Result<(), ExperimentError> {
    csv::write_utilization_impl(utilization, writer)?;
    Ok(())
}

/// One row per (zone, incident type, slot).
pub fn write_zonal_csv<W: Write>(zonal: &[ZonalSummary], writer: W) -> Result<(), ExperimentError> {
    csv::write_zonal_impl(zonal, writer)?;
    Ok(())
}

pub fn write_summaries_json<W: Write>(
    summaries: &[ReplicationSummary],
    writer: W,
) -> Result<(), ExperimentError> {
    json::write_summaries_impl(summaries, writer)?;
    Ok(())
}

fn create(path: PathBuf, written: &mut Vec<PathBuf>) -> Result<BufWriter<File>, ExperimentError> {
    let file = File::create(&path)?;
    written.push(path);
    Ok(BufWriter::new(file))
}

/// Writes every replication's CSVs plus `summaries.json` into `dir`, creating
/// it if needed. Returns the files written.
pub fn export_replications(
    results: &[ReplicationResult],
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, ExperimentError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for result in results {
        let replication = result.summary.replication;
        write_incidents_csv(
            &result.records,
            create(dir.join(format!("incidents_{replication}.csv")), &mut written)?,
        )?;
        write_utilization_csv(
            &result.utilization,
            create(dir.join(format!("utilization_{replication}.csv")), &mut written)?,
        )?;
        write_zonal_csv(
            &result.zonal,
            create(dir.join(format!("zonal_{replication}.csv")), &mut written)?,
        )?;
    }

    let summaries: Vec<ReplicationSummary> = results.iter().map(|r| r.summary.clone()).collect();
    let mut summary_file = create(dir.join("summaries.json"), &mut written)?;
    write_summaries_json(&summaries, &mut summary_file)?;
    summary_file.flush()?;

    info!(dir = %dir.display(), files = written.len(), "exported replication results");
    Ok(written)
}
