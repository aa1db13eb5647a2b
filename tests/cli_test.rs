//! End-to-end tests for the tracksplit binary.

use assert_cmd::cargo::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Command isolated from the user's config and terminal.
fn tracksplit(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("tracksplit"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("TRACKSPLIT_OUTPUT_DIR")
        .env_remove("TRACKSPLIT_QUALITY")
        .env_remove("TRACKSPLIT_FORMAT")
        .env_remove("TRACKSPLIT_OUTPUT_MODE");
    cmd
}

fn write_mono_wav(path: &Path, sample_rate: u32, seconds: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..sample_rate * seconds {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let sample = (i % 100) as i16;
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_missing_tracklist_fails() {
    let dir = TempDir::new().unwrap();

    tracksplit(dir.path())
        .arg("https://example.com/watch?v=mix")
        .arg("missing.txt")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("tracklist file not found"));
}

#[test]
fn test_tracklist_without_entries_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tracks.txt"), "# just a comment\n\n").unwrap();

    tracksplit(dir.path())
        .arg("https://example.com/watch?v=mix")
        .arg("tracks.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid tracks found"));
}

#[test]
fn test_dry_run_lists_tracks() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tracks.txt"),
        "0:00 - Opening\n1:05:30 - Late Track\ngarbage line\n",
    )
    .unwrap();

    tracksplit(dir.path())
        .arg("https://example.com/watch?v=mix")
        .arg("tracks.txt")
        .arg("--dry-run")
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 tracks"))
        .stdout(predicate::str::contains("1:05:30 - Late Track"))
        .stdout(predicate::str::contains("invalid format on line 3"));

    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_dry_run_ndjson_output() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tracks.txt"), "0:00 - A\n2:00 - B\n").unwrap();

    let output = tracksplit(dir.path())
        .arg("https://example.com/watch?v=mix")
        .arg("tracks.txt")
        .arg("--dry-run")
        .arg("--output-mode")
        .arg("ndjson")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events.first().unwrap()["event"], "tracklist_parsed");
    let result = events.last().unwrap();
    assert_eq!(result["event"], "result");
    assert_eq!(result["payload"]["result_type"], "preview");
    assert_eq!(result["payload"]["track_count"], 2);
}

#[test]
fn test_split_local_wav() {
    let dir = TempDir::new().unwrap();
    write_mono_wav(&dir.path().join("mix.wav"), 8000, 3);
    fs::write(dir.path().join("tracks.txt"), "0:00 - A\n0:01 - B\n").unwrap();

    tracksplit(dir.path())
        .arg("mix.wav")
        .arg("tracks.txt")
        .arg("--format")
        .arg("wav")
        .arg("-o")
        .arg("out")
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: 2/2 tracks"));

    let first = hound::WavReader::open(dir.path().join("out/01 - A.wav")).unwrap();
    assert_eq!(first.duration(), 8000);
    let second = hound::WavReader::open(dir.path().join("out/02 - B.wav")).unwrap();
    assert_eq!(second.duration(), 16_000);

    // Local sources are never deleted
    assert!(dir.path().join("mix.wav").exists());
    assert!(!dir.path().join("out/02 - B.wav.part").exists());
}

#[test]
fn test_unsupported_quality_is_rejected() {
    let dir = TempDir::new().unwrap();

    tracksplit(dir.path())
        .arg("mix.wav")
        .arg("tracks.txt")
        .arg("-q")
        .arg("100")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_config_path_command() {
    let dir = TempDir::new().unwrap();

    tracksplit(dir.path())
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
