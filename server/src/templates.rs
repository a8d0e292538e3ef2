use std::{collections::HashMap, fs::File, io::BufReader, path::Path, sync::Arc};

use duskwold_common::object::ModelId;
use eyre::{Result, WrapErr};
use serde::Deserialize;

/// Read-only stat block shared by every mover of one model. Loaded once at
/// startup and never mutated afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoverTemplate {
    pub name: String,
    pub level: i32,
    pub hp: i32,
    pub mp: i32,
    pub strength: i32,
    pub stamina: i32,
    pub intellect: i32,
    pub dexterity: i32,
    pub size: i16,
    /// Base movement speed in units per second.
    pub speed: f32,
    pub natural_armor: f32,
    pub resist_magic: f32,
    /// Attack cooldown in milliseconds.
    pub re_attack_delay: u64,
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    model_id: u32,
    #[serde(flatten)]
    template: MoverTemplate,
}

pub fn load_mover_templates(
    path: impl AsRef<Path>,
) -> Result<HashMap<ModelId, Arc<MoverTemplate>>> {
    let path = path.as_ref();
    let file = File::open(path).wrap_err_with(|| format!("Opening {}", path.display()))?;
    let entries: Vec<TemplateEntry> = serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("Parsing {}", path.display()))?;
    Ok(entries
        .into_iter()
        .map(|entry| (ModelId(entry.model_id), Arc::new(entry.template)))
        .collect())
}
