//! Default command: dump once, or hand the dump pass to the scheduler.
//!
//! | Mode        | When                             | Ends                            |
//! |-------------|----------------------------------|---------------------------------|
//! | One-shot    | `isCron` is false, or `--once`   | after one pass, exit 1 on error |
//! | Scheduled   | `isCron` is true                 | never; kill the process         |
//!
//! In scheduled mode the config is loaded once and shared read-only by every
//! trigger.  A failing trigger is logged and the schedule keeps going.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::{
    cli::Cli,
    config::Config,
    dump::{self, DumpEnv},
    schedule::{Job, Scheduler, TracingSink, parse_schedule},
};

/// How this invocation executes, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    OneShot,
    Scheduled,
}

pub fn select_mode(cli: &Cli, cfg: &Config) -> Mode {
    if cfg.is_cron && !cli.once {
        Mode::Scheduled
    } else {
        Mode::OneShot
    }
}

pub fn run(cli: &Cli, cfg: Config) -> Result<()> {
    let env = DumpEnv::new(&cli.bin_dir)?;

    match select_mode(cli, &cfg) {
        Mode::OneShot => run_once(&cfg, &env),
        Mode::Scheduled => run_scheduled(cfg, env),
    }
}

fn run_once(cfg: &Config, env: &DumpEnv) -> Result<()> {
    tracing::info!(targets = cfg.targets.len(), "starting dump");
    dump::run_all(cfg, env)?;
    Ok(())
}

fn run_scheduled(cfg: Config, env: DumpEnv) -> Result<()> {
    let schedule = parse_schedule(&cfg.cron_spec)?;

    if env.ensure_bin_dir().is_err() {
        tracing::warn!(
            bin_dir = %env.bin_dir.display(),
            "dump binary directory is missing, scheduled runs will fail until it exists"
        );
    }

    let cfg = Arc::new(cfg);
    let job: Job = {
        let cfg = Arc::clone(&cfg);
        Arc::new(move || dump::run_all(&cfg, &env))
    };

    let handle = Scheduler::start(schedule, job, Arc::new(TracingSink))
        .context("failed to start the scheduler thread")?;
    tracing::info!(
        schedule = %cfg.cron_spec,
        targets = cfg.targets.len(),
        "scheduler started, waiting for triggers"
    );

    if handle.wait().is_err() {
        bail!("scheduler thread panicked");
    }
    bail!("schedule '{}' has no further triggers", cfg.cron_spec)
}
