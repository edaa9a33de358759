use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const TAG: &[u8] = b"\0\0\0GROUPONE_TAG_XXX";

fn tabsalvage(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tabsalvage"));
    cmd.current_dir(workdir).arg("--color").arg("never");
    cmd
}

fn wide(text: &str) -> Vec<u8> {
    text.bytes().flat_map(|b| [b, 0]).collect()
}

/// Session holding one group "Group One" with one grouped tab.
fn write_session(dir: &Path) -> PathBuf {
    let mut buf = b"SNSS\x01\x00}".to_vec();
    buf.extend_from_slice(TAG);
    buf.extend_from_slice(b"abc\0");
    buf.extend(wide("Group One"));
    buf.push(b'$');
    buf.extend_from_slice(&[b'.'; 43]);
    for _ in 1..5 {
        buf.extend_from_slice(TAG);
        buf.extend_from_slice(b"..");
    }
    buf.extend_from_slice(b" http://a.com/x \0");
    buf.extend(wide("http://a.com/x"));
    buf.push(b' ');
    buf.extend_from_slice(TAG);

    let path = dir.join("Session_13350000000000000");
    fs::write(&path, buf).unwrap();
    path
}

fn output_folder(dir: &Path) -> PathBuf {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .find(|path| path.is_dir() && path.to_string_lossy().ends_with("_Recovered_Edge_Tabs"))
        .expect("output folder")
}

#[test]
fn cli_recover_writes_report_files() {
    let temp = tempdir().unwrap();
    let session = write_session(temp.path());

    tabsalvage(temp.path())
        .arg("recover")
        .arg("--session")
        .arg(&session)
        .arg("--no-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Detected 1 tab groups and 1 grouped tabs."));

    let folder = output_folder(temp.path());
    let date = folder
        .file_name()
        .unwrap()
        .to_string_lossy()
        .trim_end_matches("_Recovered_Edge_Tabs")
        .to_string();
    assert_eq!(date.len(), 10);

    let csv = fs::read_to_string(folder.join(format!("{date}_Recovered_Edge_Tabs.csv"))).unwrap();
    assert!(csv.contains(&format!("Session file name: {}", session.display())));
    assert!(csv.contains("Tabs file name: No file specified"));
    assert!(csv.contains("|||GROUPONE_TAG_XXX,G|r|o|u|p| |O|n|e,Group One"));
    assert!(csv.contains("Group One,http://a.com/x,http://a.com/x,"));

    let html = fs::read_to_string(folder.join(format!("{date}_Recovered_Edge_Tabs_Saved_As_Bookmarks.html"))).unwrap();
    assert!(html.contains("<DT><H3>Group One</H3>"));
    assert!(html.contains("<DT><A HREF=\"http://a.com/x\">a.com</A>"));

    let replaced = folder.join(format!(
        "{date}_Session_13350000000000000_non-printables_replaced_with_pipe_char.txt"
    ));
    let text = fs::read_to_string(replaced).unwrap();
    assert!(text.starts_with("SNSS||}|||GROUPONE_TAG_XXX"));
}

#[test]
fn cli_recover_json_prints_rows() {
    let temp = tempdir().unwrap();
    let session = write_session(temp.path());

    let output = tabsalvage(temp.path())
        .args(["recover", "--format", "json", "--session"])
        .arg(&session)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(report["groups"][0]["group_name"], "Group One");
    assert_eq!(report["rows"][0]["url"], "http://a.com/x");
    assert_eq!(report["block_start"], 7);
    assert!(fs::read_dir(temp.path()).unwrap().all(|e| !e.unwrap().path().is_dir()));
}

#[test]
fn cli_tabs_file_reclassifies() {
    let temp = tempdir().unwrap();
    let session = write_session(temp.path());
    let tabs = temp.path().join("Tabs_13350000000000000");
    fs::write(&tabs, b"\0http://z.org/\0\0http://a.com/x\0").unwrap();

    let output = tabsalvage(temp.path())
        .args(["recover", "--format", "json", "--session"])
        .arg(&session)
        .arg("--tabs")
        .arg(&tabs)
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rows"][0]["group_name"], "Ungrouped");
    assert_eq!(report["rows"][0]["tabs_verdict"], "ungrouped");
}

#[test]
fn cli_missing_session_is_tool_error() {
    let temp = tempdir().unwrap();
    tabsalvage(temp.path())
        .args(["recover", "--session", "does-not-exist"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("session file not found"));
}

#[test]
fn cli_missing_tabs_is_tool_error() {
    let temp = tempdir().unwrap();
    let session = write_session(temp.path());
    tabsalvage(temp.path())
        .arg("recover")
        .arg("--session")
        .arg(&session)
        .args(["--tabs", "no-tabs-here"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tabs file not found"));
}

#[test]
fn cli_invalid_sentinel_override_is_tool_error() {
    let temp = tempdir().unwrap();
    let session = write_session(temp.path());
    tabsalvage(temp.path())
        .arg("recover")
        .arg("--session")
        .arg(&session)
        .args(["--sentinel", "é"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("scan.sentinel"));
}

#[test]
fn cli_empty_session_is_success() {
    let temp = tempdir().unwrap();
    let session = temp.path().join("Session_empty");
    fs::write(&session, b"").unwrap();

    tabsalvage(temp.path())
        .arg("recover")
        .arg("--session")
        .arg(&session)
        .assert()
        .success()
        .stdout(predicate::str::contains("No tab groups or grouped tabs were recovered."));
}

#[test]
fn cli_discovered_config_is_used_unless_disabled() {
    let temp = tempdir().unwrap();
    let session = write_session(temp.path());
    fs::write(temp.path().join(".tabsalvage.toml"), "[scan]\nrepeat-count = 4\n").unwrap();

    let output = tabsalvage(temp.path())
        .args(["recover", "--format", "json", "--session"])
        .arg(&session)
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["groups"].as_array().unwrap().is_empty());

    let output = tabsalvage(temp.path())
        .args(["recover", "--no-config", "--format", "json", "--session"])
        .arg(&session)
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["groups"].as_array().unwrap().len(), 1);
}

#[test]
fn cli_bad_config_is_tool_error() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join(".tabsalvage.toml"), "[scan]\nnot-a-key = 1\n").unwrap();

    tabsalvage(temp.path())
        .arg("config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Config error"));
}

#[test]
fn cli_init_creates_config_once() {
    let temp = tempdir().unwrap();

    tabsalvage(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created default configuration file: .tabsalvage.toml"));
    assert!(temp.path().join(".tabsalvage.toml").exists());

    tabsalvage(temp.path())
        .arg("init")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn cli_config_defaults_as_json() {
    let temp = tempdir().unwrap();
    let output = tabsalvage(temp.path())
        .args(["config", "--defaults", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["scan"]["repeat-count"], 5);
    assert_eq!(config["scan"]["sentinel"], "|");
}

#[test]
fn cli_config_unknown_format_is_tool_error() {
    let temp = tempdir().unwrap();
    tabsalvage(temp.path())
        .args(["config", "--output", "yaml"])
        .assert()
        .code(2);
}

#[test]
fn cli_version() {
    let temp = tempdir().unwrap();
    tabsalvage(temp.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("tabsalvage "));
}
