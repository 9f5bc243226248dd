//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! passed (by reference) into the command handlers.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI arguments, shared across every subcommand.
#[derive(Parser, Debug)]
#[command(
    name    = "mongo-dumper",
    about   = "Export MongoDB databases with mongo-dump, once or on a cron schedule",
    version,
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to the configuration file.
    ///
    /// Defaults to `conf.json` in the current working directory.  A path
    /// ending in `.toml` is read as TOML.
    #[arg(short, long, default_value = "conf.json")]
    pub config: PathBuf,

    /// Directory holding the `mongo-dump` binary.
    #[arg(long, default_value = "bin")]
    pub bin_dir: PathBuf,

    /// Subcommand to run.  Omit to dump as configured.
    #[command(subcommand)]
    pub command: Option<Subcommand>,

    /// Print the parsed configuration (passwords hidden) and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Dump once and exit, even when `isCron` is set.
    #[arg(long)]
    pub once: bool,

    /// Increase log verbosity (-v debug, -vv trace).  `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Explicit subcommands.
#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum Subcommand {
    /// Write a starter config to the `--config` path.
    ///
    /// Exits with an error if the file already exists.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("mongo-dumper").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.config, PathBuf::from("conf.json"));
        assert_eq!(cli.bin_dir, PathBuf::from("bin"));
        assert!(cli.command.is_none());
        assert!(!cli.once && !cli.print_config);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn init_subcommand_with_custom_config() {
        let cli = parse(&["--config", "/etc/dumper.toml", "init"]);
        assert_eq!(cli.command, Some(Subcommand::Init));
        assert_eq!(cli.config, PathBuf::from("/etc/dumper.toml"));
    }

    #[test]
    fn verbosity_counts() {
        assert_eq!(parse(&["-vv"]).verbose, 2);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["mongo-dumper", "--nope"]).is_err());
    }
}
