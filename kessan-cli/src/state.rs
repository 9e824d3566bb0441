use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn kessan_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".kessan"))
}

pub fn ensure_kessan_home() -> Result<PathBuf> {
    let dir = kessan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
