//! Pairwise relationships between players derived from match history
//!
//! Familiarity counts how often two players shared a side; recency keeps
//! the last date they did. Both are keyed by unordered pairs and therefore
//! symmetric.

pub mod analyzer;
pub mod matrix;

pub use analyzer::{
    familiarity_from_history, recency_from_history, PairwiseRelationshipAnalyzer,
};
pub use matrix::{FamiliarityMatrix, PairKey, RecencyMatrix};
