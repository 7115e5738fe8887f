//! Main application configuration
//!
//! This module defines the primary configuration structures for the team
//! balancer, including environment variable loading, TOML files and validation.

use crate::config::balancer::BalancerConfig;
use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub balancer: BalancerConfig,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "team-balancer".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Parse an environment variable into `target` if it is set
fn override_from_env<T: FromStr>(name: &str, target: &mut T) -> Result<()> {
    if let Ok(raw) = env::var(name) {
        *target = raw
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", name, raw))?;
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        override_from_env("RATING_DEFAULT", &mut self.rating.default_rating)?;
        override_from_env(
            "RATING_DEFAULT_UNCERTAINTY",
            &mut self.rating.default_uncertainty,
        )?;
        override_from_env("RATING_K_FACTOR", &mut self.rating.k_factor)?;
        override_from_env("RATING_MIN_UNCERTAINTY", &mut self.rating.min_uncertainty)?;
        override_from_env(
            "RATING_UNCERTAINTY_DECAY",
            &mut self.rating.uncertainty_decay,
        )?;
        override_from_env("RATING_DISPLAY_SCALE", &mut self.rating.display_scale)?;
        override_from_env("RATING_DISPLAY_OFFSET", &mut self.rating.display_offset)?;

        // Balancer settings
        override_from_env("BALANCER_MIN_PLAYERS", &mut self.balancer.min_players)?;
        override_from_env("BALANCER_MAX_PLAYERS", &mut self.balancer.max_players)?;
        override_from_env(
            "BALANCER_NEVER_PAIRED_DAYS",
            &mut self.balancer.never_paired_days,
        )?;
        override_from_env(
            "BALANCER_PARALLEL_THRESHOLD",
            &mut self.balancer.parallel_threshold,
        )?;
        override_from_env("BALANCER_BETA", &mut self.balancer.beta)?;
        override_from_env("BALANCER_CONFIDENCE_Z", &mut self.balancer.confidence_z)?;

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;
    config.balancer.validate()?;

    Ok(())
}
