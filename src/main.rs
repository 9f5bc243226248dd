//! `mongo-dumper`: export MongoDB databases with `mongo-dump`, driven by `conf.json`.
//!
//! # Overview
//!
//! A thin orchestration layer: read the config, then either dump every
//! configured database once, or register the dump pass on a cron schedule
//! and keep running.  The actual export is done by the `mongo-dump` binary
//! shipped in `./bin`.
//!
//! # Usage
//!
//! ```text
//! mongo-dumper                  # dump as configured by conf.json
//! mongo-dumper init             # scaffold a conf.json in the current directory
//! mongo-dumper --print-config   # show the parsed config without running anything
//! mongo-dumper --once           # single pass even if isCron is set
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                              |
//! |--------------------------|---------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap               |
//! | [`config`]               | `Config` struct + JSON/TOML loader          |
//! | [`template`]             | `${date}` expansion in output directories   |
//! | [`runner`]               | Platform lookup and argument construction   |
//! | [`ui`]                   | Spinner, captured execution, result lines   |
//! | [`dump`]                 | One sequential pass over every target       |
//! | [`schedule`]             | Cron dispatcher with overlap guard          |
//! | [`commands::init`]       | `init` subcommand                           |
//! | [`commands::run`]        | One-shot vs scheduled entry point           |

mod cli;
mod commands;
mod config;
mod dump;
mod error;
mod runner;
mod schedule;
mod template;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Some(Subcommand::Init) => {
            commands::init::run(&cli.config)?;
        },

        None => {
            let cfg = config::load_config(&cli.config)?;

            if cli.print_config {
                println!("{cfg:#?}");
                return Ok(());
            }

            commands::run::run(&cli, cfg)?;
        },
    }

    Ok(())
}

/// Log to stderr.  `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
