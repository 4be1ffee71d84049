use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http_port: u16,

    pub map: MapConfig,
    pub columns: Columns,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            map: MapConfig::default(),
            columns: Columns::default(),
        }
    }
}

/// Line style and fallback view handed to the map widget.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// `[latitude, longitude]` shown while there is nothing to draw
    pub default_center: [f64; 2],
    pub zoom: u8,
    pub weight: u32,
    pub color: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: [-25.677209, 27.241859],
            zoom: 14,
            weight: 4,
            color: "blue".to_owned(),
        }
    }
}

/// Header names of the columns read from uploaded files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub vehicle: String,
    pub latitude: String,
    pub longitude: String,
    pub timestamp: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            vehicle: "vehicle_uid".to_owned(),
            latitude: "latitude".to_owned(),
            longitude: "longitude".to_owned(),
            timestamp: "gps_datetime".to_owned(),
        }
    }
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    let config = toml::from_str(&data).context("Failed to parse config")?;
    Ok(config)
}

/// Load an explicitly given config, or `config.toml` if there is one, or
/// fall back to defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load(path),
        None => {
            let path = Path::new("config.toml");
            if path.exists() {
                load(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}
