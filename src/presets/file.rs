//! Preset store backed by a JSON file
//!
//! The whole file is rewritten on every change. Writes go to a sibling
//! temporary file first and are renamed into place.

use crate::error::Result;
use crate::presets::memory::{rename_in, upsert};
use crate::presets::repository::{PresetRepository, WeightPreset};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
pub struct JsonFilePresetRepository {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl JsonFilePresetRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<WeightPreset>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse presets {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read presets {}", self.path.display())),
        }
    }

    async fn write(&self, presets: &[WeightPreset]) -> Result<()> {
        let raw = serde_json::to_string_pretty(presets)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, raw)
            .await
            .with_context(|| format!("Failed to write presets {}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("Failed to replace presets {}", self.path.display()))?;
        debug!("Wrote {} presets to {}", presets.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl PresetRepository for JsonFilePresetRepository {
    async fn load_all(&self) -> Result<Vec<WeightPreset>> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn save(&self, preset: WeightPreset) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut presets = self.read().await?;
        upsert(&mut presets, preset);
        self.write(&presets).await
    }

    async fn delete(&self, preset_id: Uuid) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut presets = self.read().await?;
        let before = presets.len();
        presets.retain(|p| p.id != preset_id);
        if presets.len() == before {
            return Ok(false);
        }
        self.write(&presets).await?;
        Ok(true)
    }

    async fn rename(&self, preset_id: Uuid, name: String) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut presets = self.read().await?;
        rename_in(&mut presets, preset_id, name)?;
        self.write(&presets).await
    }
}
