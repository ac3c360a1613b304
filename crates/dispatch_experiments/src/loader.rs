//! CSV input loading: resource configuration, incident arrivals and the
//! travel-time matrix.
//!
//! Every loader has a reader-based variant so the formats can be exercised
//! without touching the filesystem; `source` only labels errors.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use dispatch_core::fleet::PerVehicle;
use dispatch_core::incident::Incident;
use dispatch_core::network::StationConfig;
use dispatch_core::travel_time::{NodeId, TravelTimeMatrix};
use serde::Deserialize;
use tracing::debug;

use crate::error::LoadError;

#[derive(Debug, Deserialize)]
struct ResourceRow {
    zone: u32,
    #[serde(alias = "Station")]
    station: u8,
    t1: u32,
    t2: u32,
    t3: u32,
}

#[derive(Debug, Deserialize)]
struct IncidentRow {
    num: u64,
    arint: f64,
    inc_time: f64,
    inc_type: u32,
    location: u32,
    dact: f64,
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_error(source: &Path) -> impl Fn(csv::Error) -> LoadError + '_ {
    move |err| LoadError::Csv {
        path: source.to_path_buf(),
        source: err,
    }
}

pub fn load_stations(path: impl AsRef<Path>) -> Result<Vec<StationConfig>, LoadError> {
    let path = path.as_ref();
    read_stations(open(path)?, path)
}

/// Columns `zone, station, t1, t2, t3`; rows with `station == 0` host nothing.
pub fn read_stations(reader: impl Read, source: &Path) -> Result<Vec<StationConfig>, LoadError> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut stations = Vec::new();
    for row in csv.deserialize::<ResourceRow>() {
        let row = row.map_err(csv_error(source))?;
        if row.station == 0 {
            continue;
        }
        stations.push(StationConfig {
            node: NodeId(row.zone),
            fleet: PerVehicle::new(row.t1, row.t2, row.t3),
        });
    }
    debug!(source = %source.display(), stations = stations.len(), "loaded resource configuration");
    Ok(stations)
}

pub fn load_incidents(path: impl AsRef<Path>) -> Result<Vec<Incident>, LoadError> {
    let path = path.as_ref();
    read_incidents(open(path)?, path)
}

/// Columns `num, arint, inc_time, inc_type, location, dact`.
pub fn read_incidents(reader: impl Read, source: &Path) -> Result<Vec<Incident>, LoadError> {
    let mut csv = csv::Reader::from_reader(reader);
    let incidents = csv
        .deserialize::<IncidentRow>()
        .map(|row| {
            row.map(|row| Incident {
                seq: row.num,
                inter_arrival_secs: row.arint,
                occurred_at_secs: row.inc_time,
                incident_type: row.inc_type,
                zone: NodeId(row.location),
                service_secs: row.dact,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error(source))?;
    debug!(source = %source.display(), incidents = incidents.len(), "loaded incidents");
    Ok(incidents)
}

pub fn load_travel_times(path: impl AsRef<Path>) -> Result<TravelTimeMatrix, LoadError> {
    let path = path.as_ref();
    read_travel_times(open(path)?, path)
}

/// Header `zone, <id>, <id>, ...`; row `k` starts with the `k`-th header id
/// followed by the seconds to every header node.
pub fn read_travel_times(reader: impl Read, source: &Path) -> Result<TravelTimeMatrix, LoadError> {
    let malformed = |reason: String| LoadError::MalformedMatrix {
        path: source.to_path_buf(),
        reason,
    };
    let parse_id = |field: &str| {
        field
            .trim()
            .parse::<u32>()
            .map(NodeId)
            .map_err(|_| malformed(format!("`{field}` is not a node id")))
    };

    let mut csv = csv::Reader::from_reader(reader);
    let header = csv.headers().map_err(csv_error(source))?.clone();
    let nodes = header
        .iter()
        .skip(1)
        .map(&parse_id)
        .collect::<Result<Vec<_>, _>>()?;
    if nodes.is_empty() {
        return Err(malformed("header lists no nodes".to_string()));
    }

    let mut rows = Vec::with_capacity(nodes.len());
    for (index, record) in csv.records().enumerate() {
        let record = record.map_err(csv_error(source))?;
        let mut fields = record.iter();
        let zone = parse_id(fields.next().unwrap_or_default())?;
        match nodes.get(index) {
            Some(expected) if *expected == zone => {}
            Some(expected) => {
                return Err(malformed(format!(
                    "row {} is for node {zone}, expected {expected}",
                    index + 1
                )))
            }
            None => return Err(malformed(format!("extra row for node {zone}"))),
        }
        let row = fields
            .map(|field| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| malformed(format!("`{field}` in row for node {zone} is not a number")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    let matrix = TravelTimeMatrix::new(nodes, rows).map_err(|err| malformed(err.to_string()))?;
    debug!(source = %source.display(), nodes = matrix.len(), "loaded travel-time matrix");
    Ok(matrix)
}
