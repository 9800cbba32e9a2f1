#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn profile_path(name: &str) -> PathBuf {
    repo_root().join("profiles").join(format!("{name}.json"))
}

pub fn builtin_table_path() -> PathBuf {
    repo_root().join("catalogs").join("game_support.json")
}

/// Write `value` as JSON into `dir/name` and return the path.
pub fn write_json(dir: &Path, name: &str, value: &Value) -> Result<PathBuf> {
    let path = dir.join(name);
    let data = serde_json::to_string_pretty(value)?;
    fs::write(&path, data).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// The CLI with configuration variables cleared so the host environment
/// cannot leak into assertions.
pub fn game_support_cmd() -> Command {
    let mut cmd = Command::cargo_bin("game-support").expect("game-support binary builds");
    cmd.env_remove("GAMESUPPORT_PROFILE")
        .env_remove("GAMESUPPORT_TABLE")
        .env_remove("GAMESUPPORT_LOG");
    cmd
}

pub fn parse_stdout(stdout: &[u8]) -> Result<Value> {
    let text = String::from_utf8_lossy(stdout);
    serde_json::from_str(text.trim()).with_context(|| format!("stdout is not JSON: {text}"))
}
