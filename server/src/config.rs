use std::{fs, path::Path};

use eyre::{Result, WrapErr};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub maps: Vec<MapConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Path of the mover template data file.
    pub mover_templates: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub respawners: Vec<RespawnerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespawnerConfig {
    pub middle: [f32; 3],
    pub north_east: [f32; 3],
    pub south_west: [f32; 3],
    /// Seconds between a monster despawning and coming back.
    pub respawn_time: u64,
    pub model_id: u32,
    pub count: u32,
}

pub fn load(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).wrap_err_with(|| format!("Reading {}", path.display()))?;
    toml::from_str(&raw).wrap_err_with(|| format!("Parsing {}", path.display()))
}
