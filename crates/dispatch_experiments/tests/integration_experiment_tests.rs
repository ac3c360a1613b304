use std::fs;
use std::path::Path;

use dispatch_core::travel_time::NodeId;
use dispatch_experiments::{
    export_replications, run_experiment, ExperimentConfig, ExperimentError, LoadError,
};

const STATIONS: &str = "zone,station,t1,t2,t3\n1,0,0,0,0\n2,1,1,2,0\n3,1,1,1,1\n4,0,0,0,0\n";

const TRAVEL_TIMES: &str = "zone,1,2,3,4\n\
1,0,300,700,400\n\
2,300,0,400,200\n\
3,700,400,0,300\n\
4,400,200,300,0\n";

const ARRIVALS_A: &str = "num,arint,inc_time,inc_type,location,dact\n\
1,0,0,1,1,600\n\
2,10,10,1,1,600\n\
3,120,130,3,4,900\n\
4,60,190,2,1,300\n";

const ARRIVALS_B: &str = "num,arint,inc_time,inc_type,location,dact\n\
1,30,30,2,4,600\n\
2,5,35,2,4,600\n";

fn write_study(dir: &Path) -> std::path::PathBuf {
    fs::write(dir.join("config.csv"), STATIONS).expect("stations");
    fs::write(dir.join("od.csv"), TRAVEL_TIMES).expect("travel times");
    fs::write(dir.join("arrival_a.csv"), ARRIVALS_A).expect("arrivals a");
    fs::write(dir.join("arrival_b.csv"), ARRIVALS_B).expect("arrivals b");
    let config = r#"{
        "name": "fixture",
        "stations": "config.csv",
        "travel_times": "od.csv",
        "arrivals": ["arrival_a.csv", "arrival_b.csv"],
        "threads": 2,
        "show_progress": false
    }"#;
    let path = dir.join("experiment.json");
    fs::write(&path, config).expect("config");
    path
}

#[test]
fn loads_runs_and_exports_a_study() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ExperimentConfig::load(write_study(dir.path())).expect("config");
    let results = run_experiment(&config).expect("experiment");

    assert_eq!(results.len(), 2);
    let first = &results[0];
    assert_eq!(first.records.len(), 4);
    assert_eq!(first.summary.replication, 0);
    assert!(results.iter().all(|r| r.summary.is_complete()));

    // Incident 2 finds station 2's only T1 busy and takes station 3's.
    let second = &first.records[1];
    let t1 = second.slots[0].outcome.expect("t1 assigned");
    assert_eq!(t1.station, NodeId(3));
    assert!(!t1.within_standard);

    let out = dir.path().join("out");
    let files = export_replications(&results, &out).expect("export");
    assert_eq!(files.len(), 7);
    let incidents = fs::read_to_string(out.join("incidents_0.csv")).expect("incidents csv");
    // Header plus one row per slot: 2 + 2 + 4 + 3.
    assert_eq!(incidents.lines().count(), 12);
    assert!(out.join("summaries.json").exists());
}

#[test]
fn exporting_twice_gives_identical_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ExperimentConfig::load(write_study(dir.path())).expect("config");

    let first = run_experiment(&config).expect("first");
    let second = run_experiment(&config).expect("second");
    export_replications(&first, dir.path().join("one")).expect("export one");
    export_replications(&second, dir.path().join("two")).expect("export two");

    for name in ["incidents_0.csv", "utilization_1.csv", "zonal_0.csv", "summaries.json"] {
        let one = fs::read(dir.path().join("one").join(name)).expect("one");
        let two = fs::read(dir.path().join("two").join(name)).expect("two");
        assert_eq!(one, two, "{name} differs between runs");
    }
}

#[test]
fn synthetic_arrivals_run_without_csv_lists() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_study(dir.path());
    let config = r#"{
        "stations": "config.csv",
        "travel_times": "od.csv",
        "synthetic": {
            "seed": 3,
            "count": 25,
            "mean_inter_arrival_secs": 600.0,
            "zones": [1, 2, 3, 4],
            "incident_types": [1, 2],
            "service_secs_min": 300.0,
            "service_secs_max": 600.0,
            "replications": 3
        },
        "show_progress": false
    }"#;
    let path = dir.path().join("synthetic.json");
    fs::write(&path, config).expect("config");

    let results = run_experiment(&ExperimentConfig::load(&path).expect("config")).expect("run");
    assert_eq!(results.len(), 3);
    for (replication, result) in results.iter().enumerate() {
        assert_eq!(result.summary.replication, replication);
        assert_eq!(result.records.len(), 25);
    }
}

#[test]
fn missing_inputs_are_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ExperimentConfig {
        stations: dir.path().join("nope.csv"),
        ..Default::default()
    };
    assert!(matches!(
        run_experiment(&config),
        Err(ExperimentError::Load(LoadError::Io { .. }))
    ));

    let path = write_study(dir.path());
    let mut config = ExperimentConfig::load(path).expect("config");
    config.arrivals.clear();
    assert!(matches!(run_experiment(&config), Err(ExperimentError::NoArrivals)));
}
