use std::{collections::HashMap, sync::Arc};

use duskwold_common::object::ModelId;

use crate::templates::MoverTemplate;

/// Process-wide read-only data, shared across every map actor.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub mover_templates: HashMap<ModelId, Arc<MoverTemplate>>,
    default_mover_template: Arc<MoverTemplate>,
}

impl ServerContext {
    pub fn new(mover_templates: HashMap<ModelId, Arc<MoverTemplate>>) -> Self {
        Self { mover_templates, default_mover_template: Arc::new(MoverTemplate::default()) }
    }

    /// Missing model data degrades to a zeroed template instead of failing
    /// the tick.
    pub fn mover_template(&self, model_id: ModelId) -> Arc<MoverTemplate> {
        self.mover_templates
            .get(&model_id)
            .cloned()
            .unwrap_or_else(|| self.default_mover_template.clone())
    }
}
