use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "scrumdinger";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .context("Unable to determine config directory")
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::data_dir() {
        return Ok(dir.join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".local").join("share").join(APP_DIR));
    }
    Err(anyhow!("Unable to determine data directory"))
}

pub fn db_file() -> Result<PathBuf> {
    Ok(data_dir()?.join("scrumdinger.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_live_under_app_dir() {
        if let Ok(file) = config_file() {
            assert!(file.ends_with("scrumdinger/config.toml"));
        }
        if let Ok(db) = db_file() {
            assert!(db.ends_with("scrumdinger/scrumdinger.db"));
        }
    }
}
