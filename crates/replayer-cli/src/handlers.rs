//! Command handlers

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use replayer::{CommandTable, ResultAccumulator, SuiteRunner, SuiteSummary};
use std::io::Write;
use std::path::Path;

/// Dry-run `suite` and write the report where `config` says.
pub fn execute_dry_run(config: &CliConfig, suite: &Path) -> CliResult<SuiteSummary> {
    let run_config = config.run_config()?;
    let accumulator = ResultAccumulator::new(run_config.run_name.clone());
    let runner = SuiteRunner::new(run_config, &accumulator);

    let summary = runner.dry_run(suite)?;
    tracing::info!(
        scripts = summary.scripts,
        skipped = summary.skipped,
        runs = summary.runs,
        invalid = summary.invalid,
        "dry run finished"
    );

    match &config.output {
        Some(path) => {
            accumulator
                .write_xml(path)
                .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(accumulator.to_xml().as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(summary)
}

/// Print supported command names, one per line
pub fn execute_commands(out: &mut dyn Write) -> CliResult<()> {
    for name in CommandTable::names() {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
