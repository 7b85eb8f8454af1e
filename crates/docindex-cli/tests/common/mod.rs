#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

fn config_dir() -> &'static Path {
    static CONFIG_DIR: OnceLock<TempDir> = OnceLock::new();
    CONFIG_DIR
        .get_or_init(|| tempfile::tempdir().expect("failed to create config dir for tests"))
        .path()
}

/// Create a configured `docindex` command suitable for integration tests.
/// User preferences are isolated from the real config directory.
#[allow(dead_code)]
pub fn docindex_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docindex"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("DOCINDEX_CONFIG_DIR", config_dir());
    cmd.env_remove("DOCINDEX_SOURCE");
    cmd.env_remove("DOCINDEX_OUTPUT");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// The checked-in sample index with 46 records.
#[allow(dead_code)]
pub fn sample_index() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../docindex-core/tests/fixtures/search_index.js")
}

/// A scratch copy of the small fixture documentation project.
#[allow(dead_code)]
pub fn fixture_project() -> TempDir {
    copy_fixture("qaintensor")
}

/// A scratch copy of the four-page project the sample index was generated from.
#[allow(dead_code)]
pub fn site_project() -> TempDir {
    copy_fixture("qaintensor-site")
}

fn copy_fixture(name: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    copy_dir(&fixture, dir.path());
    dir
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}
