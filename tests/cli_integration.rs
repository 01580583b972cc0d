use serde_json::Value;
use std::process::Command;

#[path = "integration/fixtures/mod.rs"]
mod fixtures;
use fixtures::*;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::{assert_golden_file, TestFixture};

fn realign() -> Command {
    Command::new(env!("CARGO_BIN_EXE_realign"))
}

/// Default output path, stats JSON structure and console summary
#[test]
fn test_cli_writes_output_and_stats() {
    let fixture = TestFixture::new();
    let srt_path = fixture.create_file("episode.srt", NOISY_SRT);
    let reference_path = fixture.create_file("book.txt", REFERENCE_TEXT);
    let stats_path = fixture.root_path.join("stats").join("run.json");

    let output = realign()
        .arg(&srt_path)
        .arg(&reference_path)
        .arg("--no-progress")
        .arg("--stats-out")
        .arg(&stats_path)
        .output()
        .expect("Failed to run realign");

    assert!(output.status.success(), "realign failed: {}", String::from_utf8_lossy(&output.stderr));

    let corrected = fixture.read_file(fixture.corrected_path(&srt_path));
    assert_golden_file(&corrected, CORRECTED_SRT, "cli default output");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total segments: 6"), "stdout: {stdout}");
    assert!(stdout.contains("Corrected: \"Where are you going?\" asked Mary."));

    let stats: Value =
        serde_json::from_str(&fixture.read_file(&stats_path)).expect("Failed to parse JSON");
    let obj = stats.as_object().expect("Stats should be a JSON object");
    for key in [
        "run_start",
        "total_processing_time_ms",
        "segments_total",
        "segments_changed",
        "segments_unchanged",
        "correction_rate",
        "methods",
        "outcomes",
        "srt_file",
        "reference_file",
        "config",
    ] {
        assert!(obj.contains_key(key), "Missing {key} field");
    }
    assert_eq!(obj["segments_total"].as_u64(), Some(6));
    assert_eq!(obj["segments_changed"].as_u64(), Some(5));
    assert_eq!(obj["methods"]["fuzzy"].as_u64(), Some(1));
    assert!(obj["srt_file"]["read_error"].is_null());
    assert!(obj["run_start"].as_u64().unwrap() > 0);
}

#[test]
fn test_cli_explicit_output_and_flags() {
    let fixture = TestFixture::new();
    let srt_path = fixture.create_file("episode.srt", &NOISY_SRT.replace('\n', "\r\n"));
    let reference_path = fixture.create_file("book.txt", REFERENCE_TEXT);
    let output_path = fixture.root_path.join("fixed.srt");

    let output = realign()
        .arg(&srt_path)
        .arg(&reference_path)
        .arg(&output_path)
        .args(["--no-progress", "--no-fuzzy", "--use-mmap"])
        .args(["--parallel", "--chunks", "2", "--examples", "0"])
        .output()
        .expect("Failed to run realign");

    assert!(output.status.success(), "realign failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(!fixture.corrected_path(&srt_path).exists());

    let corrected = fixture.read_file(&output_path);
    assert!(corrected.contains("\r\n"));
    assert!(corrected.contains("adn teh road was thick with mud"));
    assert!(corrected.contains("\"The last train leaves at nine.\""));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Correction examples"));
}

#[test]
fn test_cli_missing_reference_fails() {
    let fixture = TestFixture::new();
    let srt_path = fixture.create_file("episode.srt", NOISY_SRT);

    let output = realign()
        .arg(&srt_path)
        .arg(fixture.root_path.join("missing.txt"))
        .arg("--no-progress")
        .output()
        .expect("Failed to run realign");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Reference file does not exist"));
}

#[test]
fn test_cli_rejects_invalid_threshold_and_rules() {
    let fixture = TestFixture::new();
    let srt_path = fixture.create_file("episode.srt", NOISY_SRT);
    let reference_path = fixture.create_file("book.txt", REFERENCE_TEXT);

    let output = realign()
        .arg(&srt_path)
        .arg(&reference_path)
        .args(["--threshold", "1.5"])
        .output()
        .expect("Failed to run realign");
    assert!(!output.status.success());

    let output = realign()
        .arg(&srt_path)
        .arg(&reference_path)
        .args(["--punctuation", "fancy"])
        .output()
        .expect("Failed to run realign");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown punctuation rule set"));
}

#[test]
fn test_cli_fail_fast_on_malformed_blocks() {
    let fixture = TestFixture::new();
    let malformed = format!("WEBVTT header\n\n{NOISY_SRT}");
    let srt_path = fixture.create_file("episode.srt", &malformed);
    let reference_path = fixture.create_file("book.txt", REFERENCE_TEXT);

    let lenient = realign()
        .arg(&srt_path)
        .arg(&reference_path)
        .arg("--no-progress")
        .output()
        .expect("Failed to run realign");
    assert!(lenient.status.success());

    let strict = realign()
        .arg(&srt_path)
        .arg(&reference_path)
        .args(["--no-progress", "--fail-fast"])
        .output()
        .expect("Failed to run realign");
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("outside valid subtitle blocks"));
}
