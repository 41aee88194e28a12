use vmc_stats::obs::{ObsManager, ObsStats, ObsValue};
use vmc_stats::report::{IterationRecord, ReportWriter};

fn seeded_manager() -> ObsManager {
    let mut manager = ObsManager::new();
    manager.add_scalar("Energy").unwrap();
    manager.add_vector("Magnetization", 2).unwrap();
    manager
}

#[test]
fn registry_keeps_insertion_order() {
    let mut manager = seeded_manager();
    manager.add_scalar("Overlap").unwrap();
    let names: Vec<&str> = manager.names().collect();
    assert_eq!(names, vec!["Energy", "Magnetization", "Overlap"]);

    let all = manager.all_stats();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].0, "Energy");
    assert_eq!(all[2].0, "Overlap");
}

#[test]
fn pushes_reach_the_right_engine() {
    let mut manager = seeded_manager();
    for i in 0..100 {
        manager.push("Energy", ObsValue::Scalar(i as f64)).unwrap();
        manager
            .push("Magnetization", ObsValue::Vector(vec![1.0, -1.0]))
            .unwrap();
    }

    match manager.stats("Energy").unwrap() {
        ObsStats::Scalar(stats) => {
            assert_eq!(stats.n, 100);
            assert!((stats.mean - 49.5).abs() < 1e-12);
        }
        ObsStats::Vector(_) => panic!("Energy is scalar"),
    }
    match manager.stats("Magnetization").unwrap() {
        ObsStats::Vector(components) => {
            assert_eq!(components.len(), 2);
            assert_eq!(components[0].n, 100);
            assert_eq!(components[0].mean, 1.0);
            assert_eq!(components[1].mean, -1.0);
        }
        ObsStats::Scalar(_) => panic!("Magnetization is a vector"),
    }
}

#[test]
fn unknown_names_and_shape_mismatches_fail() {
    let mut manager = seeded_manager();
    let err = manager.push("Missing", ObsValue::Scalar(1.0)).unwrap_err();
    assert_eq!(err.info().code, "unknown-observable");

    let err = manager
        .push("Energy", ObsValue::Vector(vec![1.0]))
        .unwrap_err();
    assert_eq!(err.info().code, "shape-mismatch");

    let err = manager
        .push("Magnetization", ObsValue::Vector(vec![1.0, 2.0, 3.0]))
        .unwrap_err();
    assert_eq!(err.info().code, "dimension-mismatch");
}

#[test]
fn reset_clears_engines_but_keeps_registrations() {
    let mut manager = seeded_manager();
    for _ in 0..10 {
        manager.push("Energy", ObsValue::Scalar(2.0)).unwrap();
    }
    manager.reset_all();
    match manager.stats("Energy").unwrap() {
        ObsStats::Scalar(stats) => assert_eq!(stats.n, 0),
        ObsStats::Vector(_) => panic!("Energy is scalar"),
    }
    assert_eq!(manager.len(), 2);
}

#[test]
fn re_adding_an_observable_starts_fresh() {
    let mut manager = seeded_manager();
    for _ in 0..10 {
        manager.push("Energy", ObsValue::Scalar(2.0)).unwrap();
    }
    manager.add_scalar("Energy").unwrap();
    match manager.stats("Energy").unwrap() {
        ObsStats::Scalar(stats) => assert_eq!(stats.n, 0),
        ObsStats::Vector(_) => panic!("Energy is scalar"),
    }
}

#[test]
fn report_writer_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let mut writer = ReportWriter::new(&path, true);

    let mut manager = seeded_manager();
    for i in 0..64 {
        manager.push("Energy", ObsValue::Scalar(i as f64)).unwrap();
        manager
            .push("Magnetization", ObsValue::Vector(vec![0.5, -0.5]))
            .unwrap();
    }
    let record = IterationRecord::from_manager(1, &manager, vec![0.5, 0.25]);
    writer.append(&record).unwrap();
    let record = IterationRecord::from_manager(2, &manager, vec![0.5, 0.25]);
    writer.append(&record).unwrap();
    assert_eq!(writer.len(), 2);

    let text = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    let output = parsed["Output"].as_array().unwrap();
    assert_eq!(output.len(), 2);
    assert_eq!(output[0]["Iteration"], 1);
    assert_eq!(output[1]["Iteration"], 2);
    assert_eq!(output[0]["Energy"]["N"], 64);
    assert!(output[0]["Energy"]["Mean"].is_f64());
    // 64 samples complete 16 level-1 bins; the error estimate is live.
    assert!(output[0]["Energy"]["Sigma"].is_f64());
    let components = output[0]["Magnetization"].as_array().unwrap();
    assert_eq!(components.len(), 2);
    assert_eq!(components[0]["Mean"], 0.5);
    assert_eq!(output[0]["Acceptance"].as_array().unwrap().len(), 2);
}

#[test]
fn sigma_serializes_as_null_when_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.log");
    let mut writer = ReportWriter::new(&path, true);

    let mut manager = ObsManager::new();
    manager.add_scalar("Energy").unwrap();
    manager.push("Energy", ObsValue::Scalar(1.0)).unwrap();
    let record = IterationRecord::from_manager(1, &manager, vec![1.0]);
    writer.append(&record).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(parsed["Output"][0]["Energy"]["Sigma"].is_null());
    assert!(parsed["Output"][0]["Energy"]["TauCorr"].is_null());
}

#[test]
fn disabled_writer_emits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("silent.log");
    let mut writer = ReportWriter::new(&path, false);

    let manager = seeded_manager();
    let record = IterationRecord::from_manager(1, &manager, Vec::new());
    writer.append(&record).unwrap();

    assert!(writer.is_empty());
    assert!(!path.exists());
}
