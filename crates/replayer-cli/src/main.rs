//! Replayer CLI: replay Selenium IDE suites into NUnit XML
//!
//! ## Usage
//!
//! ```bash
//! replayer dry-run --suite suites/smoke.html              # Report to stdout
//! replayer dry-run -s smoke.html -c firefox -c chrome -o results.xml
//! replayer commands                                       # Supported commands
//! ```

use clap::Parser;
use replayer_cli::{
    handlers, init_logging, Cli, CliConfig, CliResult, Commands, DryRunArgs, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    init_logging(verbosity);

    match cli.command {
        Commands::DryRun(args) => run_dry_run(verbosity, args),
        Commands::Commands => handlers::execute_commands(&mut std::io::stdout().lock()),
    }
}

fn run_dry_run(verbosity: Verbosity, args: DryRunArgs) -> CliResult<()> {
    let config = CliConfig::new()
        .with_verbosity(verbosity)
        .with_config_file(args.config)
        .with_base_url(args.base_url)
        .with_combinations(args.combos)
        .with_run_name(args.name)
        .with_output(args.output);

    let summary = handlers::execute_dry_run(&config, &args.suite)?;
    if config.output.is_some() && !verbosity.is_quiet() {
        eprintln!(
            "{} script(s), {} run(s), {} invalid, {} skipped",
            summary.scripts, summary.runs, summary.invalid, summary.skipped
        );
    }
    Ok(())
}
