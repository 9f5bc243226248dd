//! Error taxonomy shared by every stage of a dump run.
//!
//! Library code returns [`DumpError`] so callers can tell a bad config file
//! from a failing target.  `main` and the command handlers wrap it in
//! `anyhow` for reporting.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DumpError {
    /// The config file is missing or unreadable.
    #[error("cannot read config file {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file was read but does not match the expected shape.
    #[error("cannot parse config file {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// `init` was asked to write over an existing file.
    #[error("{} already exists, refusing to overwrite it", .path.display())]
    ConfigExists { path: PathBuf },

    /// The directory holding the dump binary does not exist.
    #[error("dump binary directory {} not found, put mongo-dump in it", .path.display())]
    MissingDependency { path: PathBuf },

    /// No dump binary is known for this operating system.
    #[error("unsupported platform '{os}', mongo-dump is only run on linux and windows")]
    UnsupportedPlatform { os: String },

    /// The dump binary failed to launch or exited non-zero for a target.
    #[error("dump of '{database}' on '{host}' failed: {detail}")]
    CommandExecution {
        host: String,
        database: String,
        detail: String,
    },

    /// The cron expression could not be parsed.
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidSchedule { expression: String, reason: String },
}
