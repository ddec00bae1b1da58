use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::geometry::BandConfig;

const DEFAULT_PATH: &str = "config.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http_port: u16,

    // size of the pool shapes are computed on, 0 means one thread per cpu
    pub workers: usize,

    /// Largest accepted upload in bytes.
    pub upload_limit: usize,

    /// Extra or replacement entries for the built-in band table.
    pub geometry: Vec<BandConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            workers: 0,
            upload_limit: 50 * 1024 * 1024,
            geometry: Vec::new(),
        }
    }
}

/// Config file to use: the explicit path, then `CELLMAP_CONFIG`, then
/// `config.toml` if it exists.
pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    if let Ok(path) = dotenvy::var("CELLMAP_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let path = Path::new(DEFAULT_PATH);
    path.exists().then(|| path.to_owned())
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    parse(&data)
}

pub fn parse(data: &str) -> Result<Config> {
    let config = toml::from_str(data).context("Failed to parse config")?;
    Ok(config)
}
