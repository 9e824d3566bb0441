use anyhow::{Context, Result, bail};
use kessan_core::EngineConfig;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_kessan_home, kessan_home};

pub fn default_config_path() -> Result<PathBuf> {
    Ok(kessan_home()?.join("config.toml"))
}

/// `--config` wins; otherwise `~/.kessan/config.toml` if it exists; otherwise
/// built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    let p = match explicit {
        Some(p) => {
            if !p.exists() {
                bail!("config not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Ok(p) if p.exists() => p,
            _ => return Ok(EngineConfig::default()),
        },
    };
    read_config(&p)
}

fn read_config(p: &Path) -> Result<EngineConfig> {
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg = EngineConfig::from_toml_str(&s).with_context(|| format!("parse {}", p.display()))?;
    tracing::debug!(path = %p.display(), "loaded config");
    Ok(cfg)
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => ensure_kessan_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let s = EngineConfig::default()
        .to_toml_string()
        .context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    println!("Wrote {}", p.display());
    Ok(())
}
