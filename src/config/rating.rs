//! Rating system configuration

use crate::error::{BalancerError, Result};
use crate::types::PlayerRating;
use serde::{Deserialize, Serialize};

/// Parameters of the team Elo model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating assigned to new players and on recompute
    pub default_rating: f64,
    /// Uncertainty assigned to new players and on recompute
    pub default_uncertainty: f64,
    /// Elo K factor applied to `actual - expected`
    pub k_factor: f64,
    /// Floor for the per-player uncertainty
    pub min_uncertainty: f64,
    /// Multiplier applied to uncertainty after each game, in (0, 1]
    pub uncertainty_decay: f64,
    /// Display transform: `rating * display_scale + display_offset`
    pub display_scale: f64,
    pub display_offset: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            default_rating: 1500.0,
            default_uncertainty: 200.0,
            k_factor: 32.0,
            min_uncertainty: 60.0,
            uncertainty_decay: 0.95,
            display_scale: 1.0,
            display_offset: 0.0,
        }
    }
}

impl RatingConfig {
    /// Rating given to players without history
    pub fn initial_rating(&self) -> PlayerRating {
        PlayerRating {
            rating: self.default_rating,
            uncertainty: self.default_uncertainty,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> anyhow::Error {
            BalancerError::ConfigurationError {
                message: message.to_string(),
            }
            .into()
        };

        if !self.default_rating.is_finite() {
            return Err(invalid("Default rating must be finite"));
        }
        if !(self.default_uncertainty > 0.0 && self.default_uncertainty.is_finite()) {
            return Err(invalid("Default uncertainty must be positive"));
        }
        if !(self.k_factor > 0.0 && self.k_factor.is_finite()) {
            return Err(invalid("K factor must be positive"));
        }
        if !(self.min_uncertainty >= 0.0 && self.min_uncertainty.is_finite()) {
            return Err(invalid("Minimum uncertainty must be non-negative"));
        }
        if !(self.uncertainty_decay > 0.0 && self.uncertainty_decay <= 1.0) {
            return Err(invalid("Uncertainty decay must be in (0, 1]"));
        }
        if !(self.display_scale > 0.0 && self.display_scale.is_finite()) {
            return Err(invalid("Display scale must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RatingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_rating().rating, 1500.0);
        assert_eq!(config.initial_rating().uncertainty, 200.0);
    }

    #[test]
    fn test_validation() {
        let mut config = RatingConfig::default();
        config.k_factor = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.uncertainty_decay = 1.5;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.display_scale = -1.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.default_uncertainty = 0.0;
        assert!(config.validate().is_err());

        for field in 0..4 {
            config = RatingConfig::default();
            match field {
                0 => config.k_factor = f64::NAN,
                1 => config.default_uncertainty = f64::NAN,
                2 => config.min_uncertainty = f64::NAN,
                _ => config.display_scale = f64::NAN,
            }
            assert!(config.validate().is_err(), "NaN accepted for field {}", field);
        }
    }
}
