//! Corruption recovery tests for arcade_cli.
//!
//! These tests verify the system can handle:
//! - Corrupted profile blobs
//! - Corrupted journal files
//! - Missing files
//! - Partial writes

use assert_cmd::Command;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("arcade"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_profile_falls_back_to_defaults() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // Write a corrupted profile blob
    fs::create_dir_all(data_dir.join("store")).unwrap();
    fs::write(data_dir.join("store/profile"), "{ invalid json }}}}")
        .expect("Failed to write corrupted profile");

    // Status recovers with a fresh default profile
    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicates::str::contains("Coins: 1000"));
}

#[test]
fn test_corrupted_profile_is_rewritten_valid() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("store")).unwrap();
    let profile_path = data_dir.join("store/profile");
    fs::write(&profile_path, "corrupted").unwrap();

    // A mutating run resets and persists a valid profile
    cli()
        .arg("play")
        .arg("obby_rush")
        .arg("--score")
        .arg("100")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let content = fs::read_to_string(&profile_path).expect("Profile should exist");
    let parsed: Result<serde_json::Value, _> = serde_json::from_str(&content);
    assert!(parsed.is_ok(), "Profile should be valid JSON");
}

#[test]
fn test_corrupted_journal_lines_ignored_during_rollup() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // One valid session
    cli()
        .arg("play")
        .arg("memory_match")
        .arg("--score")
        .arg("200")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    // Inject invalid lines around it
    let journal_path = data_dir.join("journal/game_sessions.jsonl");
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(&journal_path)
        .unwrap();
    writeln!(file, "{{ invalid json }}").unwrap();
    writeln!(file, "{{ more invalid").unwrap();
    drop(file);

    // Rollup keeps only the parseable session
    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicates::str::contains("Rolled up 1 sessions"));
}

#[test]
fn test_partial_journal_line() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // Simulate a crash mid-append: valid line, then a truncated one
    fs::create_dir_all(data_dir.join("journal")).unwrap();
    let journal_path = data_dir.join("journal/game_sessions.jsonl");

    let mut file = fs::File::create(&journal_path).unwrap();
    writeln!(file, "{{ not a session }}").unwrap();
    write!(file, r#"{{"id":"partial"#).unwrap();
    drop(file);

    // Appending after the partial write still works
    cli()
        .arg("play")
        .arg("dodge_master")
        .arg("--score")
        .arg("30")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();
}

#[test]
fn test_corrupted_auth_records_degrade_to_signed_out() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("store")).unwrap();
    fs::write(data_dir.join("store/auth_user"), "not json").unwrap();
    fs::write(data_dir.join("store/mock_users_db"), "[{ bad").unwrap();

    cli()
        .arg("auth")
        .arg("whoami")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicates::str::contains("Not signed in"));
}

#[test]
fn test_missing_journal_is_fine() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // No journal was ever created; status and rollup both cope
    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicates::str::contains("nothing to roll up"));
}

#[test]
fn test_permission_denied_profile() {
    // Skip on Windows (permission model is different)
    if cfg!(windows) {
        return;
    }

    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("store")).unwrap();
    let profile_path = data_dir.join("store/profile");
    fs::write(&profile_path, "{}").unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&profile_path).unwrap().permissions();
        perms.set_mode(0o000); // No permissions
        fs::set_permissions(&profile_path, perms).unwrap();

        // The unreadable profile degrades to defaults instead of crashing
        cli()
            .arg("status")
            .arg("--data-dir")
            .arg(&data_dir)
            .assert()
            .success();

        // Clean up permissions for temp dir cleanup
        let mut perms = fs::metadata(&profile_path).unwrap().permissions();
        perms.set_mode(0o644);
        fs::set_permissions(&profile_path, perms).unwrap();
    }
}
