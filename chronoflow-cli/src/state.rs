use anyhow::{Context, Result};
use chronoflow_core::FileStore;
use std::fs;
use std::path::PathBuf;

/// `$CHRONOFLOW_HOME`, or `~/.chronoflow`.
pub fn chronoflow_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CHRONOFLOW_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".chronoflow"))
}

pub fn ensure_chronoflow_home() -> Result<PathBuf> {
    let dir = chronoflow_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Schedule snapshots live next to the config file.
pub fn state_store() -> Result<FileStore> {
    Ok(FileStore::new(ensure_chronoflow_home()?))
}
