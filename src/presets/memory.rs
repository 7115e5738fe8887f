//! In-memory preset store

use crate::error::{BalancerError, Result};
use crate::presets::repository::{PresetRepository, WeightPreset};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Presets kept in insertion order
#[derive(Debug, Default)]
pub struct InMemoryPresetRepository {
    presets: RwLock<Vec<WeightPreset>>,
}

impl InMemoryPresetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets(presets: Vec<WeightPreset>) -> Self {
        Self {
            presets: RwLock::new(presets),
        }
    }
}

/// Insert or replace by id
pub(crate) fn upsert(presets: &mut Vec<WeightPreset>, preset: WeightPreset) {
    match presets.iter_mut().find(|p| p.id == preset.id) {
        Some(existing) => *existing = preset,
        None => presets.push(preset),
    }
}

pub(crate) fn rename_in(presets: &mut [WeightPreset], preset_id: Uuid, name: String) -> Result<()> {
    let preset = presets
        .iter_mut()
        .find(|p| p.id == preset_id)
        .ok_or_else(|| BalancerError::PresetNotFound {
            preset_id: preset_id.to_string(),
        })?;
    preset.name = name;
    Ok(())
}

#[async_trait]
impl PresetRepository for InMemoryPresetRepository {
    async fn load_all(&self) -> Result<Vec<WeightPreset>> {
        Ok(self.presets.read().await.clone())
    }

    async fn save(&self, preset: WeightPreset) -> Result<()> {
        upsert(&mut *self.presets.write().await, preset);
        Ok(())
    }

    async fn delete(&self, preset_id: Uuid) -> Result<bool> {
        let mut presets = self.presets.write().await;
        let before = presets.len();
        presets.retain(|p| p.id != preset_id);
        Ok(presets.len() != before)
    }

    async fn rename(&self, preset_id: Uuid, name: String) -> Result<()> {
        rename_in(&mut self.presets.write().await, preset_id, name)
    }
}
