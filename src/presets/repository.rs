//! Named weight presets and their storage interface

use crate::balance::WeightVector;
use crate::error::{BalancerError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest preset name accepted by `validate_preset_name`
pub const MAX_PRESET_NAME_LENGTH: usize = 64;

/// A saved set of balancing weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPreset {
    pub id: Uuid,
    pub name: String,
    pub weights: WeightVector,
    pub created_at: DateTime<Utc>,
}

impl WeightPreset {
    pub fn new(name: impl Into<String>, weights: WeightVector) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            weights,
            created_at: Utc::now(),
        }
    }
}

/// Storage for weight presets
///
/// Stores do not enforce unique names; callers check with
/// [`validate_preset_name`] first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresetRepository: Send + Sync {
    /// Every preset, oldest first
    async fn load_all(&self) -> Result<Vec<WeightPreset>>;

    /// Insert a preset or replace the one with the same id
    async fn save(&self, preset: WeightPreset) -> Result<()>;

    /// Remove a preset, returning whether it existed
    async fn delete(&self, preset_id: Uuid) -> Result<bool>;

    /// Change a preset's name; fails with `PresetNotFound` for unknown ids
    async fn rename(&self, preset_id: Uuid, name: String) -> Result<()>;
}

/// Trim and check a preset name against the existing presets
///
/// `renaming` is the id of the preset being renamed, which may keep its own
/// name. Comparison ignores case.
pub fn validate_preset_name(
    name: &str,
    existing: &[WeightPreset],
    renaming: Option<Uuid>,
) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BalancerError::InvalidPresetName {
            reason: "name must not be empty".to_string(),
        }
        .into());
    }
    if name.chars().count() > MAX_PRESET_NAME_LENGTH {
        return Err(BalancerError::InvalidPresetName {
            reason: format!("name longer than {} characters", MAX_PRESET_NAME_LENGTH),
        }
        .into());
    }
    let taken = existing
        .iter()
        .filter(|preset| Some(preset.id) != renaming)
        .any(|preset| preset.name.to_lowercase() == name.to_lowercase());
    if taken {
        return Err(BalancerError::InvalidPresetName {
            reason: format!("a preset named '{}' already exists", name),
        }
        .into());
    }
    Ok(name.to_string())
}
