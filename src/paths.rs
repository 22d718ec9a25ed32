//! Home-based storage paths for visage persistence.
//!
//! Everything lives under `~/.visage/`:
//! - `store.json` - the key-value store (credentials, mock accounts, subscription)
//! - `logs/events.jsonl` - structured event log
//!
//! `VISAGE_HOME` overrides the base directory, which is also how tests
//! isolate themselves from a real home directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const VISAGE_DIR: &str = ".visage";

/// Returns the visage base directory, creating it if needed.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or the
/// directory cannot be created.
pub fn visage_home_dir() -> Result<PathBuf> {
    let base = match std::env::var_os("VISAGE_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .context("Could not determine home directory for client storage")?
            .join(VISAGE_DIR),
    };
    fs::create_dir_all(&base)
        .with_context(|| format!("Failed to create visage directory: {}", base.display()))?;
    Ok(base)
}

/// Returns the key-value store file path: `~/.visage/store.json`
pub fn store_path() -> Result<PathBuf> {
    Ok(visage_home_dir()?.join("store.json"))
}

/// Returns the logs directory, creating it if needed: `~/.visage/logs/`
pub fn logs_dir() -> Result<PathBuf> {
    let dir = visage_home_dir()?.join("logs");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    Ok(dir)
}
