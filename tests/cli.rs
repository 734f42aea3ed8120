use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn repo_path(relative: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(relative)
        .to_string_lossy()
        .into_owned()
}

fn evaluate() -> Command {
    let mut cmd = Command::cargo_bin("evaluate").expect("evaluate bin");
    cmd.args(["--bodies", &repo_path("configs/bodies")]);
    cmd
}

#[test]
fn prints_manoeuvre_table() {
    evaluate()
        .args(["--itinerary", &repo_path("configs/itineraries/earth_venus_mars.toml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Itinerary: earth-venus-mars"))
        .stdout(predicate::str::contains("launch"))
        .stdout(predicate::str::contains("deep_space"))
        .stdout(predicate::str::contains("Total dv:"));
}

#[test]
fn layout_lists_every_slot() {
    evaluate()
        .args([
            "--itinerary",
            &repo_path("configs/itineraries/earth_venus_mars.toml"),
            "--layout",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 design variables"))
        .stdout(predicate::str::contains("x[ 0] node 0: departure epoch [MJD2000]"))
        .stdout(predicate::str::contains("x[ 4] node 2: DSM time fraction [-]"));
}

#[test]
fn writes_csv_and_json_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("artifacts/maneuvers.csv");
    let legs_path = dir.path().join("artifacts/legs.csv");
    let json_path = dir.path().join("artifacts/report.json");

    evaluate()
        .args([
            "--itinerary",
            &repo_path("configs/itineraries/earth_mars_insertion.toml"),
            "--csv",
            csv_path.to_str().unwrap(),
            "--legs-csv",
            legs_path.to_str().unwrap(),
            "--json",
            json_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let mut reader = csv::Reader::from_path(&csv_path).expect("maneuver csv");
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["index", "kind", "leg", "epoch_mjd2000", "delta_v_km_s"]
    );
    let kinds: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[1].to_string())
        .collect();
    assert_eq!(kinds, vec!["launch", "deep_space", "insertion"]);

    let legs = std::fs::read_to_string(&legs_path).unwrap();
    assert_eq!(legs.lines().count(), 2);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["itinerary"], "earth-mars-insertion");
    assert_eq!(json["design_vector"].as_array().unwrap().len(), 7);
    assert_eq!(json["maneuvers"].as_array().unwrap().len(), 3);
    let total: f64 = json["maneuvers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["delta_v_km_s"].as_f64().unwrap())
        .sum();
    let reported = json["total_delta_v_km_s"].as_f64().unwrap();
    assert!((total - reported).abs() < 1e-9);
}

#[test]
fn design_vector_override_is_validated() {
    evaluate()
        .args([
            "--itinerary",
            &repo_path("configs/itineraries/earth_venus_mars.toml"),
            "--design-vector",
            "3224,226,1400",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("design vector has 3 entries"));
}

#[test]
fn missing_itinerary_fails() {
    evaluate()
        .args(["--itinerary", &repo_path("configs/itineraries/nope.toml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading itinerary"));
}

#[test]
fn help_describes_direction_flag() {
    evaluate()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--retrograde"))
        .stdout(predicate::str::contains(
            "Fly every Lambert arc retrograde (clockwise seen from +z) instead of prograde",
        ))
        .stdout(predicate::str::contains("long way").not());
}
