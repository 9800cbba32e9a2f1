//! Run configuration shared by the CLI and tests.
//!
//! Flags win over environment variables; an empty environment variable
//! counts as unset so `GAMESUPPORT_TABLE= game-support ...` falls back to the
//! builtin table.

use crate::catalog::TableIndex;
use anyhow::Result;
use std::env;
use std::path::PathBuf;

pub const PROFILE_ENV: &str = "GAMESUPPORT_PROFILE";
pub const TABLE_ENV: &str = "GAMESUPPORT_TABLE";
pub const LOG_ENV: &str = "GAMESUPPORT_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Where the capability table comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableSource {
    Builtin,
    Path(PathBuf),
}

impl TableSource {
    /// Explicit path first, then `GAMESUPPORT_TABLE`, then the builtin table.
    pub fn resolve(cli_path: Option<PathBuf>) -> Self {
        Self::from_candidates(cli_path, env_non_empty(TABLE_ENV))
    }

    fn from_candidates(cli_path: Option<PathBuf>, env_path: Option<String>) -> Self {
        match cli_path.or_else(|| env_path.map(PathBuf::from)) {
            Some(path) => TableSource::Path(path),
            None => TableSource::Builtin,
        }
    }

    /// Load and validate the table.
    pub fn load(&self) -> Result<TableIndex> {
        match self {
            TableSource::Builtin => TableIndex::builtin(),
            TableSource::Path(path) => TableIndex::load(path),
        }
    }
}

/// Shape of the printed report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputShape {
    #[default]
    Nested,
    Flat,
}

/// Log filter directive: explicit value, then `GAMESUPPORT_LOG`, then `warn`.
pub fn log_filter(cli_filter: Option<String>) -> String {
    cli_filter
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env_non_empty(LOG_ENV))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

pub fn env_non_empty(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_path_wins_over_env() {
        let source = TableSource::from_candidates(
            Some(PathBuf::from("cli.json")),
            Some("env.json".to_string()),
        );
        assert_eq!(source, TableSource::Path(PathBuf::from("cli.json")));
    }

    #[test]
    fn env_path_used_without_cli() {
        let source = TableSource::from_candidates(None, Some("env.json".to_string()));
        assert_eq!(source, TableSource::Path(PathBuf::from("env.json")));
    }

    #[test]
    fn builtin_when_nothing_configured() {
        let source = TableSource::from_candidates(None, None);
        assert_eq!(source, TableSource::Builtin);
        assert_eq!(source.load().unwrap().len(), 27);
    }

    #[test]
    fn missing_table_path_is_an_error() {
        let source = TableSource::Path(PathBuf::from("/nonexistent/table.json"));
        let err = source.load().unwrap_err();
        assert!(format!("{err:#}").contains("reading capability table"));
    }

    #[test]
    fn explicit_log_filter_wins() {
        assert_eq!(log_filter(Some("debug".into())), "debug");
    }
}
