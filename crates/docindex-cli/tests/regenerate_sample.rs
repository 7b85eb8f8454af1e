#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{docindex_cmd, sample_index, site_project};
use predicates::prelude::*;
use std::fs;

#[test]
fn build_reproduces_sample_index() {
    // Given: the documentation project behind the sample index
    let project = site_project();
    let expected = fs::read_to_string(sample_index()).unwrap();

    // When: building it
    docindex_cmd()
        .current_dir(project.path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 46 records from 4 pages"));

    // Then: the output matches the sample byte for byte
    let output = fs::read_to_string(project.path().join("build/search_index.js")).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn build_stdout_matches_sample_index() {
    let project = site_project();

    docindex_cmd()
        .current_dir(project.path())
        .args(["build", "--stdout"])
        .assert()
        .success()
        .stdout(fs::read_to_string(sample_index()).unwrap());
}

#[test]
fn committed_sample_is_up_to_date() {
    // Given: the sample index committed as the project's output
    let project = site_project();
    let output = project.path().join("build/search_index.js");
    fs::create_dir_all(output.parent().unwrap()).unwrap();
    fs::copy(sample_index(), &output).unwrap();

    // Then: a rebuild would not change it
    docindex_cmd()
        .current_dir(project.path())
        .args(["build", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn overloads_resolve_to_distinct_anchors() {
    let project = site_project();

    let assert = docindex_cmd()
        .current_dir(project.path())
        .args(["build", "--stdout"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    // `MPO(cg::CircuitGate)` and `MPO(cg::AbstractCircuitGate)` share a docstring text
    assert_eq!(stdout.matches(r#"#Qaintensor.MPO-Tuple{Qaintessent.CircuitGate}""#).count(), 1);
    assert_eq!(
        stdout.matches(r#"#Qaintensor.MPO-Tuple{Qaintessent.AbstractCircuitGate}""#).count(),
        1
    );
    assert!(stdout.contains(r#""text":"Qaintensor.jl is an extension to the  digital quantum"#));
    assert!(stdout.contains(r#""text":"Pages = [\"index.md\", \"tensors.md\", \"mps.md\", \"mpo.md\"]""#));
}
