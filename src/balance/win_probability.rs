//! Win probability for a proposed split
//!
//! Uses the Weng-Lin expected score from skillratings, which is a logistic
//! function of the rating gap scaled by `sqrt(σ1² + σ2² + 2β²)`. The band
//! comes from shifting side one's rating by `z` combined standard deviations
//! in each direction.

use crate::config::BalancerConfig;
use crate::error::{BalancerError, Result};
use crate::types::PlayerRating;
use serde::{Deserialize, Serialize};
use skillratings::weng_lin::{expected_score, WengLinConfig, WengLinRating};

/// Aggregate rating of one side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub rating: f64,
    pub uncertainty: f64,
}

impl TeamRating {
    /// Mean member rating; uncertainty is the standard error `sqrt(Σσ²) / n`
    pub fn from_members(members: &[PlayerRating]) -> Result<Self> {
        if members.is_empty() {
            return Err(BalancerError::InvalidMatch {
                reason: "cannot rate an empty side".to_string(),
            }
            .into());
        }
        let n = members.len() as f64;
        let rating = members.iter().map(|m| m.rating).sum::<f64>() / n;
        let variance: f64 = members.iter().map(|m| m.uncertainty.powi(2)).sum();
        Ok(Self {
            rating,
            uncertainty: variance.sqrt() / n,
        })
    }
}

impl From<TeamRating> for WengLinRating {
    fn from(team: TeamRating) -> Self {
        WengLinRating {
            rating: team.rating,
            uncertainty: team.uncertainty,
        }
    }
}

/// Percentages for both sides, each with its own band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinProbability {
    pub side1_probability: u8,
    pub side1_lower: u8,
    pub side1_upper: u8,
    pub side2_probability: u8,
    pub side2_lower: u8,
    pub side2_upper: u8,
}

#[derive(Debug, Clone)]
pub struct WinProbabilityEstimator {
    config: WengLinConfig,
    confidence_z: f64,
}

impl WinProbabilityEstimator {
    pub fn new(beta: f64, confidence_z: f64) -> Result<Self> {
        if !(beta > 0.0) || !(confidence_z > 0.0) {
            return Err(BalancerError::ConfigurationError {
                message: format!(
                    "beta ({}) and confidence z ({}) must be positive",
                    beta, confidence_z
                ),
            }
            .into());
        }
        Ok(Self {
            config: WengLinConfig {
                beta,
                ..Default::default()
            },
            confidence_z,
        })
    }

    pub fn from_config(config: &BalancerConfig) -> Result<Self> {
        Self::new(config.beta, config.confidence_z)
    }

    fn side_one_chance(&self, side1: TeamRating, side2: TeamRating) -> f64 {
        let (chance, _) = expected_score(&side1.into(), &side2.into(), &self.config);
        chance
    }

    /// Estimate from two aggregate ratings
    pub fn estimate(&self, side1: TeamRating, side2: TeamRating) -> WinProbability {
        let spread =
            self.confidence_z * (side1.uncertainty.powi(2) + side2.uncertainty.powi(2)).sqrt();
        let shifted = |delta: f64| TeamRating {
            rating: side1.rating + delta,
            ..side1
        };

        let point = to_percent(self.side_one_chance(side1, side2));
        let lower = to_percent(self.side_one_chance(shifted(-spread), side2)).min(point);
        let upper = to_percent(self.side_one_chance(shifted(spread), side2)).max(point);

        WinProbability {
            side1_probability: point,
            side1_lower: lower,
            side1_upper: upper,
            side2_probability: 100 - point,
            side2_lower: 100 - upper,
            side2_upper: 100 - lower,
        }
    }

    /// Estimate from member ratings of each side
    pub fn estimate_sides(
        &self,
        side1: &[PlayerRating],
        side2: &[PlayerRating],
    ) -> Result<WinProbability> {
        Ok(self.estimate(
            TeamRating::from_members(side1)?,
            TeamRating::from_members(side2)?,
        ))
    }
}

fn to_percent(probability: f64) -> u8 {
    (probability.clamp(0.0, 1.0) * 100.0).round() as u8
}
