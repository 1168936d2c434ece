//! End-to-end tests driving the `birdclock` binary.
//!
//! Each test gets its own catalog in a temp directory; `HOME` and
//! `XDG_CONFIG_HOME` point there too so no user config leaks in.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const CATALOG: &str = r#"{
    "seasons": {
        "spring": { "months": [3, 4, 5] },
        "rest": { "months": [1, 2, 6, 7, 8, 9, 10, 11, 12] }
    },
    "quietHours": {
        "spring": { "start": "22:00", "end": "06:00" },
        "rest": { "start": "21:00", "end": "07:00" }
    },
    "birds": {
        "blackbird": {
            "name": "Blackbird",
            "slug": "common-blackbird",
            "seasons": { "spring": ["08:00", "18:00"] }
        },
        "robin": {
            "name": "Robin",
            "slug": "european-robin",
            "seasons": { "spring": ["07:00", "12:00"] }
        }
    }
}"#;

fn birdclock_binary() -> String {
    env!("CARGO_BIN_EXE_birdclock").to_string()
}

fn setup(catalog: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("bird_data.json"), catalog).unwrap();
    temp
}

fn birdclock(temp: &Path) -> Command {
    let mut cmd = Command::new(birdclock_binary());
    cmd.env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join("config"))
        .env("XDG_STATE_HOME", temp.join("state"))
        .env("BIRDCLOCK_CATALOG_PATH", temp.join("bird_data.json"))
        .env("BIRDCLOCK_BIRDS_DIR", temp.join("birds"))
        .env_remove("BIRDCLOCK_MODE")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_resolve_prints_active_bird() {
    let temp = setup(CATALOG);
    let output = birdclock(temp.path())
        .args(["resolve", "--at", "2025-04-10T12:30"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "Current time: 12:30 - spring\nCurrent bird: Robin\n"
    );
}

#[test]
fn test_resolve_json() {
    let temp = setup(CATALOG);
    let output = birdclock(temp.path())
        .args(["resolve", "--at", "2025-08-01 23:15", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["state"], "quiet-hours");
    assert_eq!(value["season"], "rest");
}

#[test]
fn test_resolve_rejects_bad_time() {
    let temp = setup(CATALOG);
    let output = birdclock(temp.path())
        .args(["resolve", "--at", "7:30"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid datetime"));
}

#[test]
fn test_config_file_sets_quiet_rule() {
    let temp = setup(CATALOG);
    let config_path = temp.path().join("birdclock.toml");
    std::fs::write(&config_path, "quiet_rule = \"always-wrap\"\n").unwrap();

    // A daytime window only differs between the two rules outside it.
    let catalog = CATALOG.replace(
        r#""spring": { "start": "22:00", "end": "06:00" }"#,
        r#""spring": { "start": "13:00", "end": "15:00" }"#,
    );
    std::fs::write(temp.path().join("bird_data.json"), catalog).unwrap();

    let window_aware = birdclock(temp.path())
        .args(["resolve", "--at", "2025-04-10T12:30"])
        .output()
        .unwrap();
    let always_wrap = birdclock(temp.path())
        .arg("--config")
        .arg(&config_path)
        .args(["resolve", "--at", "2025-04-10T12:30"])
        .output()
        .unwrap();

    assert!(stdout(&window_aware).contains("Current bird: Robin"));
    assert!(stdout(&always_wrap).contains("Current bird: quiet-hours"));
}

#[test]
fn test_check_accepts_valid_catalog() {
    let temp = setup(CATALOG);
    let output = birdclock(temp.path()).arg("check").output().unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Seasons: 2"));
    assert!(out.contains("Birds: 2"));
    assert!(out.contains("Seasons without birds: rest"));
}

#[test]
fn test_check_rejects_missing_quiet_hours() {
    let temp = setup(&CATALOG.replace(
        r#""rest": { "start": "21:00", "end": "07:00" }"#,
        r#""other": { "start": "21:00", "end": "07:00" }"#,
    ));
    let output = birdclock(temp.path()).arg("check").output().unwrap();

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("season rest has no quiet hours"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn test_schedule_filters_season() {
    let temp = setup(CATALOG);
    let output = birdclock(temp.path())
        .args(["schedule", "--season", "spring"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "spring (months 3, 4, 5)\n  quiet 22:00-06:00, overnight\n  07:00  Robin\n  08:00  Blackbird\n  12:00  Robin\n  18:00  Blackbird\n"
    );
}

#[test]
fn test_interactive_run_with_piped_commands() {
    let temp = setup(CATALOG);
    let mut child = birdclock(temp.path())
        .args(["run", "--mode", "interactive", "--at", "2025-04-10T07:30"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"n\nn\ns\nq\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("Bird Sound and Display Clock\n"));
    assert!(out.contains(
        "Current time: 07:30 - spring\nCurrent bird: Robin\nEnter command (n/p/s/q): "
    ));
    assert!(out.contains("Current time: 08:30 - spring\nCurrent bird: Blackbird\n"));
    // The second step stays within the Blackbird slot.
    assert!(!out.contains("09:30"));
    // No birds/ directory exists, so the announce fails without ending the loop.
    assert!(out.contains("Could not play sound: missing resource for blackbird"));
}

#[test]
fn test_interactive_run_ends_on_eof() {
    let temp = setup(CATALOG);
    let output = birdclock(temp.path())
        .args(["run", "--at", "2025-04-10T23:00"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Current bird: quiet-hours"));
}

#[test]
fn test_deployed_run_stops_on_sigterm() {
    let temp = setup(CATALOG);
    let mut child = birdclock(temp.path())
        .args(["run", "--mode", "deployed", "--at", "2025-04-10T12:30"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut reader = BufReader::new(child.stdout.take().unwrap());
    let mut seen = String::new();
    while !seen.contains("Current bird:") {
        let read = reader.read_line(&mut seen).unwrap();
        assert!(read > 0, "stdout closed early: {seen}");
    }

    let killed = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    reader.read_to_string(&mut seen).unwrap();
    let status = child.wait().unwrap();

    assert!(status.success());
    assert!(seen.contains("Current bird: Robin\n"));
    assert!(seen.ends_with("Program interrupted by user\n"), "{seen}");
}
