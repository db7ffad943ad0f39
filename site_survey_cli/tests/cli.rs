use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use site_survey::drawing::{Drawing, Peg};
use site_survey::geometry::Point;
use site_survey::io::project::{write_project_json, ProjectFile};
use site_survey::surveying::Station;
use std::process::Command;

fn ramp_csv(dir: &assert_fs::TempDir) -> assert_fs::fixture::ChildPath {
    let file = dir.child("ramp.csv");
    file.write_str("0,0,0\n10,0,0\n10,10,10\n0,10,10\n").unwrap();
    file
}

#[test]
fn join_command() {
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["join", "0", "0", "3", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Distance: 5.000"));
}

#[test]
fn join_swaps_axes() {
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["--swap-xy", "--decimals", "1", "join", "0", "0", "3", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{0394}N: 4.0\n\u{0394}E: 3.0"));
}

fn project_with_station(dir: &assert_fs::TempDir, backsight: bool) -> String {
    let mut drawing = Drawing::with_survey_layers();
    drawing.push_peg(Peg::new("STN", Point::new(0.0, 0.0), "Pegs"));
    drawing.push_peg(Peg::new("P7", Point::new(10.0, 0.0), "Pegs"));
    drawing.setup.set_station(Station::new("STN", Point::new(0.0, 0.0)));
    if backsight {
        drawing.setup.set_backsight(Station::new("BS", Point::new(0.0, 10.0))).unwrap();
    }
    let path = dir.child("site.json");
    let path = path.path().to_str().unwrap().to_string();
    write_project_json(&path, &ProjectFile::from_drawing(&drawing)).unwrap();
    path
}

#[test]
fn stakeout_command() {
    let dir = assert_fs::TempDir::new().unwrap();
    let project = project_with_station(&dir, true);
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["stakeout", project.as_str(), "P7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P7: Bearing 090\u{00B0} 00' 00.00\", Distance 10.000"))
        .stdout(predicate::str::contains("Turn angle: 90.0000"));
}

#[test]
fn stakeout_unknown_peg_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    let project = project_with_station(&dir, false);
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["stakeout", project.as_str(), "Q1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No peg named Q1"));
}

#[test]
fn contours_command() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = ramp_csv(&dir);
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["contours", file.path().to_str().unwrap(), "--interval", "5", "--major-factor", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 3 contour levels (2 major), 4 segments"));
}

#[test]
fn volume_command_json() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = ramp_csv(&dir);
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["volume", file.path().to_str().unwrap(), "--design-level", "0", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fill\": 0.0"))
        .stdout(predicate::str::contains("\"triangles\": 2"));
}

#[test]
fn volume_rejects_missing_elevations() {
    let file = assert_fs::NamedTempFile::new("flat.csv").unwrap();
    file.write_str("0,0\n1,0\n0,1\n").unwrap();
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["volume", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected three comma-separated values"));
}

#[test]
fn settings_command_fills_defaults() {
    let file = assert_fs::NamedTempFile::new("settings.json").unwrap();
    file.write_str(r#"{"snap_tolerance_px": 6}"#).unwrap();
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["settings", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"snap_tolerance_px\": 6.0"))
        .stdout(predicate::str::contains("\"circle_segments\": 64"));
}

#[test]
fn project_summary_of_missing_file_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["project-summary", dir.child("none.json").path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading"));
}

#[test]
fn project_summary_command() {
    let dir = assert_fs::TempDir::new().unwrap();
    let project = project_with_station(&dir, false);
    Command::cargo_bin("site_survey_cli")
        .unwrap()
        .args(["project-summary", project.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pegs: 2"))
        .stdout(predicate::str::contains("Station: STN (0.000, 0.000)"));
}
