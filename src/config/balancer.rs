//! Team formation configuration

use crate::error::{BalancerError, Result};
use serde::{Deserialize, Serialize};

/// Day count standing in for "never shared a side" in recency scoring
pub const NEVER_PAIRED_DAYS: f64 = 365.0;

/// Widest candidate set a partition bitmask can describe
pub const MAX_SUPPORTED_PLAYERS: usize = 63;

/// Limits and tuning for partition search and win probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Fewest candidates a balance request accepts
    pub min_players: usize,
    /// Most candidates a balance request accepts; enumeration is exhaustive
    pub max_players: usize,
    /// Day count used for pairs that never shared a side
    pub never_paired_days: f64,
    /// Partition count from which scoring runs on the rayon pool
    pub parallel_threshold: usize,
    /// Performance spread used by the win probability model
    pub beta: f64,
    /// Standard-normal quantile for the win probability band
    pub confidence_z: f64,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 20,
            never_paired_days: NEVER_PAIRED_DAYS,
            parallel_threshold: 4096,
            beta: 200.0,
            confidence_z: 1.96,
        }
    }
}

impl BalancerConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> anyhow::Error {
            BalancerError::ConfigurationError { message }.into()
        };

        if self.min_players < 2 {
            return Err(invalid("Minimum players must be at least 2".to_string()));
        }
        if self.max_players < self.min_players {
            return Err(invalid(format!(
                "Maximum players ({}) must not be below minimum players ({})",
                self.max_players, self.min_players
            )));
        }
        if self.max_players > MAX_SUPPORTED_PLAYERS {
            return Err(invalid(format!(
                "Maximum players cannot exceed {}",
                MAX_SUPPORTED_PLAYERS
            )));
        }
        if !(self.never_paired_days >= 0.0 && self.never_paired_days.is_finite()) {
            return Err(invalid(
                "Never-paired day count must be a non-negative number".to_string(),
            ));
        }
        if !(self.beta > 0.0 && self.beta.is_finite()) {
            return Err(invalid("Beta must be positive".to_string()));
        }
        if !(self.confidence_z > 0.0 && self.confidence_z.is_finite()) {
            return Err(invalid("Confidence z must be positive".to_string()));
        }
        Ok(())
    }
}
