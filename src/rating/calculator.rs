//! Rating calculator trait
//!
//! This module defines the interface the rating engine uses to turn one
//! match result into per-player rating changes.

use crate::types::{PlayerId, PlayerRating, RatingChange, Side};
use serde::{Deserialize, Serialize};

/// Result of a rating calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingCalculationResult {
    /// Rating changes for all players, side one first
    pub rating_changes: Vec<RatingChange>,
    /// Quality score of the match (0.0 to 1.0, higher is more even)
    pub match_quality: f64,
}

/// Trait for calculating rating changes after a two-sided match
pub trait RatingCalculator: Send + Sync {
    /// Calculate rating changes for both sides of a finished match
    ///
    /// # Arguments
    /// * `side_one` - (player_id, current_rating) pairs on side one
    /// * `side_two` - (player_id, current_rating) pairs on side two
    /// * `winner` - the side that won
    fn calculate_rating_changes(
        &self,
        side_one: &[(PlayerId, PlayerRating)],
        side_two: &[(PlayerId, PlayerRating)],
        winner: Side,
    ) -> crate::error::Result<RatingCalculationResult>;

    /// Get the initial rating for new players
    fn get_initial_rating(&self) -> PlayerRating;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}
