//! `mongo-dumper init`: write a starter config.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use console::style;

use crate::{
    config::{Config, ConfigFormat},
    error::DumpError,
};

/// Write [`Config::starter`] to `path` in the format its extension implies.
///
/// Refuses to touch an existing file.
pub fn run(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(DumpError::ConfigExists {
            path: path.to_path_buf(),
        }
        .into());
    }

    let text = ConfigFormat::from_path(path).render(&Config::starter())?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;

    println!(
        "  {}  wrote {}",
        style("✓").green().bold(),
        style(path.display()).bold()
    );
    println!("     Edit the configs list, then put mongo-dump in ./bin.");
    Ok(())
}
