//! Rating system built on team Elo
//!
//! This module provides the rating calculator seam, the skillratings-backed
//! team Elo implementation and the `RatingEngine` that owns every rating
//! mutation, including deterministic replay of the full match history.

pub mod calculator;
pub mod elo;
pub mod engine;

// Re-export commonly used types
pub use calculator::{RatingCalculationResult, RatingCalculator};
pub use elo::TeamEloCalculator;
pub use engine::{validate_participations, RatingEngine, RecomputeSummary};
