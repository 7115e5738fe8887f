//! Team Elo rating implementation
//!
//! Each side is represented by the mean rating of its members. Every player
//! is then rated individually against the opposing side's mean with the Elo
//! update from the skillratings crate: `K × (actual − expected)`.
//! Uncertainty is not part of the Elo update; it shrinks geometrically with
//! games played and only feeds win probability estimates.

use crate::config::RatingConfig;
use crate::error::{BalancerError, Result};
use crate::rating::calculator::{RatingCalculationResult, RatingCalculator};
use crate::types::{PlayerId, PlayerRating, RatingChange, Side};
use crate::utils::mean;
use skillratings::elo::{elo, expected_score, EloConfig, EloRating};
use skillratings::Outcomes;

/// Team Elo calculator
#[derive(Debug, Clone)]
pub struct TeamEloCalculator {
    config: RatingConfig,
}

impl TeamEloCalculator {
    /// Create a new team Elo calculator
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Aggregate rating of a side: the mean of its members
    pub fn team_rating(members: &[(PlayerId, PlayerRating)]) -> f64 {
        let ratings: Vec<f64> = members.iter().map(|(_, r)| r.rating).collect();
        mean(&ratings)
    }

    /// Expected score of a player against an opposing aggregate rating
    pub fn expected_score(&self, player: f64, opponent_team: f64) -> f64 {
        let (expected, _) = expected_score(
            &EloRating { rating: player },
            &EloRating {
                rating: opponent_team,
            },
        );
        expected
    }

    fn decayed_uncertainty(&self, uncertainty: f64) -> f64 {
        (uncertainty * self.config.uncertainty_decay).max(self.config.min_uncertainty)
    }

    fn rate_side(
        &self,
        members: &[(PlayerId, PlayerRating)],
        side: Side,
        opponent_team: f64,
        won: bool,
    ) -> Vec<RatingChange> {
        let elo_config = EloConfig {
            k: self.config.k_factor,
        };
        let opponent = EloRating {
            rating: opponent_team,
        };
        let outcome = if won { Outcomes::WIN } else { Outcomes::LOSS };

        members
            .iter()
            .map(|(player_id, old_rating)| {
                let (updated, _) = elo(&(*old_rating).into(), &opponent, &outcome, &elo_config);
                RatingChange {
                    player_id: player_id.clone(),
                    side,
                    old_rating: *old_rating,
                    new_rating: PlayerRating {
                        rating: updated.rating,
                        uncertainty: self.decayed_uncertainty(old_rating.uncertainty),
                    },
                    expected: self.expected_score(old_rating.rating, opponent_team),
                    won,
                }
            })
            .collect()
    }
}

impl RatingCalculator for TeamEloCalculator {
    fn calculate_rating_changes(
        &self,
        side_one: &[(PlayerId, PlayerRating)],
        side_two: &[(PlayerId, PlayerRating)],
        winner: Side,
    ) -> Result<RatingCalculationResult> {
        if side_one.is_empty() || side_two.is_empty() {
            return Err(BalancerError::InvalidMatch {
                reason: "Both sides need at least one player for rating calculation"
                    .to_string(),
            }
            .into());
        }

        let team_one = Self::team_rating(side_one);
        let team_two = Self::team_rating(side_two);

        let mut rating_changes = self.rate_side(side_one, Side::One, team_two, winner == Side::One);
        rating_changes.extend(self.rate_side(side_two, Side::Two, team_one, winner == Side::Two));

        // Even sides expect 0.5 each
        let match_quality = 1.0 - (self.expected_score(team_one, team_two) - 0.5).abs() * 2.0;

        Ok(RatingCalculationResult {
            rating_changes,
            match_quality,
        })
    }

    fn get_initial_rating(&self) -> PlayerRating {
        self.config.initial_rating()
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}
