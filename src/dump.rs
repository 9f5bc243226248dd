//! The dump pass: one `mongo-dump` invocation per configured target.
//!
//! Targets run strictly one after another.  The first target that fails to
//! launch or exits non-zero ends the pass; the targets after it are not
//! attempted and the error names the failing host and database.

use std::path::PathBuf;

use crate::{
    config::Config,
    error::DumpError,
    runner::{Platform, dump_command, dump_program},
    template::apply_date_token,
    ui::{StageOutcome, print_summary, run_stage},
};

/// Where the dump binary lives and which flavour of it to run.
#[derive(Debug, Clone)]
pub struct DumpEnv {
    pub bin_dir: PathBuf,
    pub platform: Platform,
}

impl DumpEnv {
    /// Environment for the current platform.
    pub fn new(bin_dir: impl Into<PathBuf>) -> Result<Self, DumpError> {
        Ok(Self {
            bin_dir: bin_dir.into(),
            platform: Platform::current()?,
        })
    }

    pub fn program(&self) -> PathBuf {
        dump_program(&self.bin_dir, self.platform)
    }

    /// Fails with [`DumpError::MissingDependency`] unless `bin_dir` is a
    /// directory.
    pub fn ensure_bin_dir(&self) -> Result<(), DumpError> {
        if self.bin_dir.is_dir() {
            Ok(())
        } else {
            Err(DumpError::MissingDependency {
                path: self.bin_dir.clone(),
            })
        }
    }
}

/// Dump every target in `cfg`, stopping at the first failure.
///
/// `${date}` in each output directory is expanded at the moment that target
/// is dumped.
pub fn run_all(cfg: &Config, env: &DumpEnv) -> Result<(), DumpError> {
    env.ensure_bin_dir()?;

    if cfg.targets.is_empty() {
        tracing::info!("no targets configured, nothing to dump");
        return Ok(());
    }

    let program = env.program();
    let mut outcomes: Vec<StageOutcome> = Vec::with_capacity(cfg.targets.len());

    for target in &cfg.targets {
        let output_dir = apply_date_token(&target.output_dir);
        let args = dump_command(&program, target, &output_dir);

        tracing::debug!(host = %target.host, db = %target.database, out = %output_dir, "dumping");
        let outcome = run_stage(&target.label(), &args);
        outcome.print();

        if outcome.failed() {
            let detail = outcome.failure_detail();
            outcomes.push(outcome);
            print_summary(&outcomes);
            return Err(DumpError::CommandExecution {
                host: target.host.clone(),
                database: target.database.clone(),
                detail,
            });
        }

        tracing::info!(host = %target.host, db = %target.database, out = %output_dir, "dump complete");
        outcomes.push(outcome);
    }

    print_summary(&outcomes);
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
