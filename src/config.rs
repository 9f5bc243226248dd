//! Configuration types and loading logic.
//!
//! `Config` is a direct 1-to-1 mapping of `conf.json`.  Every field has a
//! zero default, so a file that only lists `configs` is a valid one-shot
//! config.  Unknown keys are ignored.
//!
//! # File format
//!
//! ```json
//! {
//!   "isCron": true,
//!   "cronSpec": "0 0 2 * * *",
//!   "configs": [
//!     { "host": "db1.lan:27017", "user": "backup", "pwd": "s3cret",
//!       "db": "orders", "out": "/srv/dump/${date}" }
//!   ]
//! }
//! ```
//!
//! A path ending in `.toml` is read as TOML with the same key names.

use std::{fmt, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DumpError;

// ─── Top-level ────────────────────────────────────────────────────────────────

/// Root configuration object.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Run under the scheduler instead of once.
    #[serde(rename = "isCron")]
    pub is_cron: bool,

    /// Cron expression, seconds first (`sec min hour dom month dow`).
    ///
    /// Only parsed when `is_cron` is set.  Classic five-field expressions are
    /// accepted too, see [`crate::schedule::parse_schedule`].
    #[serde(rename = "cronSpec")]
    pub cron_spec: String,

    /// Databases to export, dumped in order.
    #[serde(rename = "configs")]
    pub targets: Vec<DatabaseTarget>,
}

impl Config {
    /// Config written by `mongo-dumper init`.
    pub fn starter() -> Self {
        Self {
            is_cron: false,
            cron_spec: "0 0 2 * * *".into(),
            targets: vec![DatabaseTarget {
                host: "127.0.0.1:27017".into(),
                user: "backup".into(),
                password: String::new(),
                database: "admin".into(),
                output_dir: "./dump/${date}".into(),
            }],
        }
    }
}

// ─── Targets ──────────────────────────────────────────────────────────────────

/// One database to export.
///
/// Values are passed to the dump binary verbatim; nothing here is checked for
/// emptiness.
#[derive(Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseTarget {
    pub host: String,
    pub user: String,
    #[serde(rename = "pwd")]
    pub password: String,
    /// Database to dump.  Also used as the authentication database.
    #[serde(rename = "db")]
    pub database: String,
    /// Output directory, may contain `${date}`.
    #[serde(rename = "out")]
    pub output_dir: String,
}

impl DatabaseTarget {
    /// Short `host/database` label used in terminal output.
    pub fn label(&self) -> String {
        format!("{}/{}", self.host, self.database)
    }
}

// Hand-written so `--print-config` and log lines never show the password.
impl fmt::Debug for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseTarget")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .field("database", &self.database)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "****" }
}

// ─── Format ───────────────────────────────────────────────────────────────────

/// On-disk encoding, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` selects TOML, anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    /// Serialise `cfg` in this format.
    pub fn render(self, cfg: &Config) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(cfg)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .context("serialising config as JSON"),
            Self::Toml => toml::to_string(cfg).context("serialising config as TOML"),
        }
    }

    fn parse(self, bytes: &[u8]) -> std::result::Result<Config, String> {
        match self {
            Self::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
            Self::Toml => {
                let text = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
                toml::from_str(text).map_err(|e| e.to_string())
            },
        }
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read and parse a `Config` from `path`.
///
/// Unlike a missing optional file elsewhere, a missing config is an error:
/// there is nothing sensible to dump without one.
pub fn load_config(path: &Path) -> std::result::Result<Config, DumpError> {
    let bytes = fs::read(path).map_err(|source| DumpError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    ConfigFormat::from_path(path)
        .parse(&bytes)
        .map_err(|reason| DumpError::ConfigParse {
            path: path.to_path_buf(),
            reason,
        })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
