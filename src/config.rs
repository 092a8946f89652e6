use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::DatasetKind;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub datasets: DatasetsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatasetsConfig {
    pub districts: Option<DatasetConfig>,
    pub active_claims: Option<DatasetConfig>,
    pub inactive_claims: Option<DatasetConfig>,
}

impl DatasetsConfig {
    pub fn get(&self, kind: DatasetKind) -> Option<&DatasetConfig> {
        match kind {
            DatasetKind::Districts => self.districts.as_ref(),
            DatasetKind::ActiveClaims => self.active_claims.as_ref(),
            DatasetKind::InactiveClaims => self.inactive_claims.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    pub path: PathBuf,
    /// Overrides the CRS declared in the file
    pub source_epsg: Option<u32>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
