mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn gyre() -> Command {
    Command::cargo_bin("gyre").unwrap()
}

#[test]
fn tree_prints_structure_and_counts() {
    let dir = tempdir().unwrap();
    let path = common::flat_file(dir.path());

    gyre()
        .arg("tree")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("temp (lat=3, lon=4) [Geo2D] float32"))
        .stdout(predicate::str::contains("0 groups, 3 variables, 2 dimensions"))
        .stdout(predicate::str::contains("netcdf-flat"));
}

#[test]
fn tree_of_grouped_file_nests_variables() {
    let dir = tempdir().unwrap();
    let path = common::grouped_file(dir.path());

    gyre()
        .arg("tree")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("└── 📂 ocean (1)"))
        .stdout(predicate::str::contains("    └── 🌡️ salt (depth=5) [1D] float64"))
        .stdout(predicate::str::contains("netcdf-grouped"));
}

#[test]
fn missing_file_fails() {
    gyre()
        .args(["tree", "/no/such/file.nc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn unsupported_extension_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    gyre()
        .arg("tree")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format: txt"));
}

#[test]
fn unreadable_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.nc");
    std::fs::write(&path, "not netCDF").unwrap();

    gyre()
        .arg("tree")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn info_prints_resolved_attributes() {
    let dir = tempdir().unwrap();
    let path = common::flat_file(dir.path());

    gyre()
        .arg("info")
        .arg(&path)
        .arg("/temp")
        .assert()
        .success()
        .stdout(predicate::str::contains("Path: /temp"))
        .stdout(predicate::str::contains("Shape: 3 × 4"))
        .stdout(predicate::str::contains("units: K"));
}

#[test]
fn info_on_coordinate_variable_shows_the_variable() {
    let dir = tempdir().unwrap();
    let path = common::flat_file(dir.path());

    gyre()
        .arg("info")
        .arg(&path)
        .arg("/lat")
        .assert()
        .success()
        .stdout(predicate::str::contains("Type: variable"))
        .stdout(predicate::str::contains("Path: /lat"))
        .stdout(predicate::str::contains("units: degrees_north"));
}

#[test]
fn info_on_root_lists_global_attributes() {
    let dir = tempdir().unwrap();
    let path = common::flat_file(dir.path());

    gyre()
        .arg("info")
        .arg(&path)
        .arg("/")
        .assert()
        .success()
        .stdout(predicate::str::contains("title: flat fixture"));
}

#[test]
fn info_on_unknown_path_fails() {
    let dir = tempdir().unwrap();
    let path = common::flat_file(dir.path());

    gyre()
        .arg("info")
        .arg(&path)
        .arg("/nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found: /nope"));
}

#[test]
fn view_refuses_missing_file_before_touching_the_terminal() {
    gyre()
        .args(["view", "/no/such/file.nc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn unknown_theme_is_rejected() {
    gyre()
        .args(["--theme", "purple", "tree", "x.nc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("purple"));
}

#[test]
fn log_file_records_the_scan() {
    let dir = tempdir().unwrap();
    let path = common::flat_file(dir.path());
    let log = dir.path().join("gyre.log");

    gyre()
        .arg("--log")
        .arg(&log)
        .arg("tree")
        .arg(&path)
        .env_remove("GYRE_LOG")
        .assert()
        .success();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("Starting Gyre"));
    assert!(contents.contains("netcdf-flat"));
}
