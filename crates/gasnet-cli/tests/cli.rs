use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const STAR_CONFIG: &str = r#"{
    "name": "compressor-star",
    "description": "one trunk, two delivery legs",
    "points": {
        "R1": {"id": "R1", "name": "Field R1", "type": "Receipt",
               "minPressure": 800, "maxPressure": 1000, "currentPressure": 900,
               "supplyCapacity": 1000, "unitCost": 0.05},
        "C1": {"id": "C1", "name": "Station C1", "type": "Compressor",
               "minPressure": 300, "maxPressure": 1200, "currentPressure": 750,
               "maxPressureBoost": 400, "fuelConsumptionRate": 0.02},
        "D1": {"id": "D1", "name": "City Gate D1", "type": "Delivery",
               "minPressure": 300, "maxPressure": 800, "currentPressure": 550,
               "demandRequirement": 600},
        "D2": {"id": "D2", "name": "Industrial D2", "type": "Delivery",
               "minPressure": 300, "maxPressure": 800, "currentPressure": 550,
               "demandRequirement": 400}
    },
    "segments": {
        "S1": {"id": "S1", "name": "R1-C1", "fromPointId": "R1", "toPointId": "C1",
               "capacity": 1200, "length": 50, "diameter": 36,
               "frictionFactor": 0.015, "transportationCost": 0.10},
        "S2": {"id": "S2", "name": "C1-D1", "fromPointId": "C1", "toPointId": "D1",
               "capacity": 600, "length": 30, "diameter": 24,
               "frictionFactor": 0.018, "transportationCost": 0.12},
        "S3": {"id": "S3", "name": "C1-D2", "fromPointId": "C1", "toPointId": "D2",
               "capacity": 500, "length": 40, "diameter": 20,
               "frictionFactor": 0.020, "transportationCost": 0.15}
    }
}"#;

fn write_config(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("network.json");
    fs::write(&path, STAR_CONFIG).unwrap();
    path
}

#[test]
fn validate_accepts_good_config() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    Command::cargo_bin("gasnet")
        .unwrap()
        .args(["validate", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration is valid"));
}

#[test]
fn validate_rejects_bad_config() {
    let dir = tempdir().unwrap();
    let bad = STAR_CONFIG.replace("\"supplyCapacity\": 1000", "\"supplyCapacity\": 100");
    let path = dir.path().join("bad.json");
    fs::write(&path, bad).unwrap();
    Command::cargo_bin("gasnet")
        .unwrap()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn optimize_writes_result_json() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    let out = dir.path().join("result.json");
    Command::cargo_bin("gasnet")
        .unwrap()
        .args([
            "optimize",
            config.to_str().unwrap(),
            "--algorithm",
            "cost-lp",
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("optimal"));
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("\"segmentFlows\""));
    assert!(written.contains("\"S1\""));
}

#[test]
fn optimize_exits_nonzero_on_infeasible() {
    let dir = tempdir().unwrap();
    // Sever the trunk: cost algorithms cannot meet demand
    let cut = STAR_CONFIG.replace(
        "\"frictionFactor\": 0.015, \"transportationCost\": 0.10}",
        "\"frictionFactor\": 0.015, \"transportationCost\": 0.10, \"isActive\": false}",
    );
    assert!(cut.contains("isActive"), "replacement must hit");
    let path = dir.path().join("cut.json");
    fs::write(&path, cut).unwrap();
    Command::cargo_bin("gasnet")
        .unwrap()
        .args(["optimize", path.to_str().unwrap(), "--algorithm", "cost-lp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("infeasible"));
}

#[test]
fn trace_reports_feasibility() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    Command::cargo_bin("gasnet")
        .unwrap()
        .args(["trace", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("network is feasible"))
        .stdout(predicate::str::contains("S1"));
}

#[test]
fn compare_prints_table() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    Command::cargo_bin("gasnet")
        .unwrap()
        .args([
            "compare",
            config.to_str().unwrap(),
            "--algorithms",
            "cost-lp,cost-graph",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("cost-lp"))
        .stdout(predicate::str::contains("cost-graph"));
}

#[test]
fn algorithms_lists_registry() {
    Command::cargo_bin("gasnet")
        .unwrap()
        .arg("algorithms")
        .assert()
        .success()
        .stdout(predicate::str::contains("throughput-lp"))
        .stdout(predicate::str::contains("balance-graph"));
}

#[test]
fn scenario_batch_runs_end_to_end() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    let spec = dir.path().join("scenarios.yaml");
    fs::write(
        &spec,
        r#"
version: 1
scenarios:
  - scenario_id: half-demand
    demand_scale: 0.5
"#,
    )
    .unwrap();
    let out = dir.path().join("batch");

    Command::cargo_bin("gasnet")
        .unwrap()
        .args([
            "scenarios",
            "run",
            config.to_str().unwrap(),
            "--spec",
            spec.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--algorithms",
            "cost-lp,throughput-graph",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("batch complete"));

    assert!(out.join("batch_manifest.json").exists());
    assert!(out.join("base/cost-lp/result.json").exists());
    assert!(out.join("half-demand/throughput-graph/result.json").exists());
}
