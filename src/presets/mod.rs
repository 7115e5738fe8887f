//! Saved weight presets for weighted balancing

pub mod file;
pub mod memory;
pub mod repository;

pub use file::JsonFilePresetRepository;
pub use memory::InMemoryPresetRepository;
pub use repository::{
    validate_preset_name, PresetRepository, WeightPreset, MAX_PRESET_NAME_LENGTH,
};
