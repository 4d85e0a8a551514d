use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "sector_view_exit_{}_{}",
        std::process::id(),
        name
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_in(dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sector_view"))
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

#[test]
fn malformed_world_exits_with_parse_error() {
    let dir = scratch_dir("malformed");
    fs::write(dir.join("test.json"), r#"{"sectors":[{"points":[1,2],"colors":[0,0,0,255]}]"#)
        .unwrap();

    let out = run_in(&dir);
    fs::remove_dir_all(&dir).unwrap();

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(out.status.code(), Some(1), "{stderr}");
    assert!(stderr.contains("Parse error"), "{stderr}");
    assert!(stderr.contains("Failed to load 'test.json'"), "{stderr}");
}

#[test]
fn missing_world_exits_with_open_error() {
    let dir = scratch_dir("missing");

    let out = run_in(&dir);
    fs::remove_dir_all(&dir).unwrap();

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(out.status.code(), Some(1), "{stderr}");
    assert!(stderr.contains("FileOpen error"), "{stderr}");
    assert!(!stderr.contains("Parse error"), "{stderr}");
}

#[test]
fn schema_violation_exits_with_schema_error() {
    let dir = scratch_dir("schema");
    fs::write(dir.join("test.json"), r#"{"sectors":[{"points":[1,2]}]}"#).unwrap();

    let out = run_in(&dir);
    fs::remove_dir_all(&dir).unwrap();

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(out.status.code(), Some(1), "{stderr}");
    assert!(stderr.contains("Schema error"), "{stderr}");
    assert!(stderr.contains("'colors'"), "{stderr}");
}
