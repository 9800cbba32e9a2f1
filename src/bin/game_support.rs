//! Evaluates a capability table against a host profile and prints the report.
//!
//! Exit codes: 0 on success (and when every `--has` query is supported), 2
//! when a `--has` query is unsupported, 1 on configuration or load errors.

use anyhow::{Result, anyhow};
use clap::Parser;
use game_support::config::{self, OutputShape, PROFILE_ENV, TableSource, env_non_empty};
use game_support::{
    CapabilityRegistry, CapabilityReport, Probe, ProfileHost, logging, parse_query, split_list,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "game-support",
    about = "Detect game-relevant capabilities of a host and print them as JSON"
)]
struct Args {
    /// Host profile to evaluate (falls back to GAMESUPPORT_PROFILE).
    #[arg(long, value_name = "PATH")]
    profile: Option<PathBuf>,

    /// Capability table to use instead of the builtin one (falls back to GAMESUPPORT_TABLE).
    #[arg(long, value_name = "PATH")]
    table: Option<PathBuf>,

    /// Print the legacy flat `{name: value}` object.
    #[arg(long)]
    flat: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Print CATEGORY.NAME=true|false instead of the report; repeatable or comma-separated.
    #[arg(long = "has", value_name = "CATEGORY.NAME")]
    has: Vec<String>,

    /// List the table's capabilities without evaluating them.
    #[arg(long)]
    list: bool,

    /// Log filter directives (falls back to GAMESUPPORT_LOG, then `warn`).
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn main() {
    let args = Args::parse();
    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<i32> {
    logging::init(&config::log_filter(args.log.clone()))?;

    let index = TableSource::resolve(args.table.clone()).load()?;
    if args.list {
        for entry in index.entries() {
            println!(
                "{}.{}\t{}",
                entry.category,
                entry.name,
                entry.probe.kind().as_str()
            );
        }
        return Ok(0);
    }

    let queries = parse_queries(&args.has)?;
    let profile_path = args
        .profile
        .clone()
        .or_else(|| env_non_empty(PROFILE_ENV).map(PathBuf::from))
        .ok_or_else(|| anyhow!("No host profile given. Pass --profile or set {PROFILE_ENV}."))?;
    let host = ProfileHost::load(&profile_path)?;
    info!(profile = %host.name, table = %index.key().0, "evaluating capability table");

    let mut registry = CapabilityRegistry::from_table(index.table(), host);
    let report = registry.evaluate();

    if !queries.is_empty() {
        let mut all_supported = true;
        for (category, name) in &queries {
            if index
                .capability(&category.as_str().into(), &name.as_str().into())
                .is_none()
            {
                warn!(category = %category, name = %name, "query names no capability in the table");
            }
            let supported = registry.has(category, name);
            println!("{category}.{name}={supported}");
            all_supported &= supported;
        }
        return Ok(if all_supported { 0 } else { 2 });
    }

    let shape = if args.flat {
        OutputShape::Flat
    } else {
        OutputShape::Nested
    };
    println!("{}", render(&report, shape, args.pretty)?);
    Ok(0)
}

fn parse_queries(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .flat_map(|value| split_list(value))
        .map(|query| parse_query(&query))
        .collect()
}

fn render(report: &CapabilityReport, shape: OutputShape, pretty: bool) -> Result<String> {
    match shape {
        OutputShape::Nested => to_json(report, pretty),
        OutputShape::Flat => to_json(&report.flatten(), pretty),
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}
