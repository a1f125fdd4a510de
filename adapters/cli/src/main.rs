#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays scripted wildlife sync sessions.

mod replay;
mod scenario;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use wildlife_sync_core::ProbabilityTable;

use crate::scenario::Scenario;

/// Command-line arguments for the wildlife sync replay.
#[derive(Debug, Parser)]
#[command(name = "wildlife-sync", about = "Replays a scripted wildlife sync session")]
struct CliArgs {
    /// Seed shared by the world and the coordinator's random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// TOML scenario to replay instead of the built-in one.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// JSON probability table to install into the resolver slot.
    #[arg(long, value_name = "PATH")]
    table: Option<PathBuf>,
}

/// Entry point for the wildlife sync command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin()?,
    };
    let table = args.table.as_deref().map(load_table).transpose()?;

    let summary = replay::run(&scenario, table, args.seed)?;
    println!("{summary}");
    Ok(())
}

fn load_table(path: &Path) -> Result<ProbabilityTable> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read probability table {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("failed to parse probability table {}", path.display()))
}
