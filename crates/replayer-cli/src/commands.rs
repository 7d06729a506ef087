//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Replay Selenium IDE suites and emit NUnit XML results
#[derive(Parser, Debug)]
#[command(name = "replayer", version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a suite without a browser and write the NUnit report
    DryRun(DryRunArgs),

    /// List supported Selenium commands
    Commands,
}

/// Arguments for the dry-run command
#[derive(Args, Debug)]
pub struct DryRunArgs {
    /// Suite file (HTML table of script links)
    #[arg(short, long)]
    pub suite: PathBuf,

    /// Replace every script's recorded base URL
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Fixture name; repeat for several combinations
    #[arg(short, long = "combo")]
    pub combos: Vec<String>,

    /// Report name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Report file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// YAML run configuration
    #[arg(long, env = "REPLAYER_CONFIG")]
    pub config: Option<PathBuf>,
}
