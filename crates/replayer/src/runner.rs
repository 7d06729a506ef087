//! Suite runner: loads a suite, replays each script per combination.

use crate::commands::CommandTable;
use crate::config::RunConfig;
use crate::interpreter::ScriptInterpreter;
use crate::parser::{load_script, load_suite, SuiteEntry};
use crate::report::ResultAccumulator;
use crate::result::{ReplayError, ReplayResult};
use crate::script::{RunDescriptor, Script};
use crate::session::SessionFactory;
use std::path::{Path, PathBuf};

/// Property name used to record soft failures on a test case
pub const VERIFICATION_PROPERTY: &str = "verification-error";

/// Counts from one suite run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    /// Scripts loaded from the suite
    pub scripts: usize,
    /// Scripts that could not be loaded
    pub skipped: usize,
    /// Script × combination runs started
    pub runs: usize,
    /// Runs that ended on an error or failed assertion
    pub aborted: usize,
    /// Runs marked invalid for using an unsupported command
    pub invalid: usize,
}

/// A script loaded from a suite entry
#[derive(Debug, Clone)]
pub struct LoadedScript {
    /// Suite entry the script came from
    pub entry: SuiteEntry,
    /// Resolved script path
    pub path: PathBuf,
    /// Parsed script, base URL already overridden
    pub script: Script,
}

impl LoadedScript {
    /// Test name: the suite link text, or the script title when blank
    #[must_use]
    pub fn test_name(&self) -> &str {
        if self.entry.title.trim().is_empty() {
            &self.script.title
        } else {
            &self.entry.title
        }
    }
}

/// Replays a suite into a [`ResultAccumulator`]
#[derive(Debug)]
pub struct SuiteRunner<'a> {
    config: RunConfig,
    accumulator: &'a ResultAccumulator,
}

impl<'a> SuiteRunner<'a> {
    /// Create a runner reporting to `accumulator`
    #[must_use]
    pub const fn new(config: RunConfig, accumulator: &'a ResultAccumulator) -> Self {
        Self {
            config,
            accumulator,
        }
    }

    /// Run configuration
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Load every script a suite links to.
    ///
    /// Scripts that fail to load are logged and counted, not fatal.
    ///
    /// # Errors
    ///
    /// Returns error if the suite file itself cannot be read or parsed
    pub fn load(&self, suite_path: &Path) -> ReplayResult<(Vec<LoadedScript>, usize)> {
        let entries = load_suite(suite_path)?;
        let base_dir = suite_path.parent().unwrap_or_else(|| Path::new("."));

        let mut loaded = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for entry in entries {
            let path = base_dir.join(&entry.href);
            tracing::info!(path = %path.display(), "opening script");
            match load_script(&path) {
                Ok(script) => {
                    let script = match &self.config.base_url {
                        Some(url) => script.with_base_url(url.clone()),
                        None => script,
                    };
                    loaded.push(LoadedScript {
                        entry,
                        path,
                        script,
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping script");
                    skipped += 1;
                }
            }
        }
        Ok((loaded, skipped))
    }

    /// Replay a suite without a browser, recording each known line as a pass.
    ///
    /// # Errors
    ///
    /// Returns error if the suite file cannot be read or parsed
    pub fn dry_run(&self, suite_path: &Path) -> ReplayResult<SuiteSummary> {
        let (scripts, skipped) = self.load(suite_path)?;
        let mut summary = SuiteSummary {
            scripts: scripts.len(),
            skipped,
            ..SuiteSummary::default()
        };

        let suite = suite_name(suite_path);
        for loaded in &scripts {
            for combination in &self.config.combinations {
                let desc = RunDescriptor::new(&suite, combination, loaded.test_name());
                summary.runs += 1;
                if !self.dry_run_script(&desc, &loaded.script) {
                    summary.invalid += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Dry-run one script; `false` when it uses an unsupported command
    pub fn dry_run_script(&self, desc: &RunDescriptor, script: &Script) -> bool {
        self.accumulator.begin(desc);
        for line in &script.lines {
            if !CommandTable::contains(&line.command) {
                tracing::warn!(run = %desc, command = %line.command, "unsupported command");
                self.accumulator.invalid(desc);
                return false;
            }
            tracing::debug!(run = %desc, line = %line, "dry run");
            self.accumulator.assertion_passed(desc);
        }
        true
    }

    /// Replay a suite against sessions opened by `factory`.
    ///
    /// # Errors
    ///
    /// Returns error if the suite file cannot be read or parsed
    pub fn run_live(
        &self,
        suite_path: &Path,
        factory: &mut dyn SessionFactory,
    ) -> ReplayResult<SuiteSummary> {
        let (scripts, skipped) = self.load(suite_path)?;
        let mut summary = SuiteSummary {
            scripts: scripts.len(),
            skipped,
            ..SuiteSummary::default()
        };

        let suite = suite_name(suite_path);
        for loaded in &scripts {
            for combination in &self.config.combinations {
                let desc = RunDescriptor::new(&suite, combination, loaded.test_name());
                summary.runs += 1;
                match self.run_script(&desc, &loaded.script, factory) {
                    Ok(()) => {}
                    Err(ReplayError::UnsupportedCommand { command }) => {
                        tracing::warn!(run = %desc, %command, "unsupported command");
                        self.accumulator.invalid(&desc);
                        summary.invalid += 1;
                    }
                    Err(e) => {
                        tracing::warn!(run = %desc, error = %e, "script aborted");
                        summary.aborted += 1;
                    }
                }
            }
        }
        Ok(summary)
    }

    fn run_script(
        &self,
        desc: &RunDescriptor,
        script: &Script,
        factory: &mut dyn SessionFactory,
    ) -> ReplayResult<()> {
        self.accumulator.begin(desc);
        let mut session = factory.open(&desc.fixture).map_err(|e| {
            let err = ReplayError::Session(e);
            self.accumulator.exception(desc, &err);
            err
        })?;

        let mut interpreter = ScriptInterpreter::new(session.as_mut(), desc.clone())
            .with_accumulator(self.accumulator)
            .with_options(self.config.interpreter_options());
        let result = interpreter.run(script);
        for message in interpreter.verification_errors() {
            self.accumulator
                .add_property(desc, VERIFICATION_PROPERTY, message);
        }
        result
    }
}

/// Suite name: the suite file name without extension
#[must_use]
pub fn suite_name(suite_path: &Path) -> String {
    suite_path
        .file_stem()
        .map_or_else(|| "suite".to_string(), |s| s.to_string_lossy().into_owned())
}
