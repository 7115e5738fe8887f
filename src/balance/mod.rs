//! Team formation
//!
//! Exhaustive search over two-sided partitions of a small candidate set:
//! single-objective balancing, a weighted blend of six normalized
//! objectives, and win probability estimates for the resulting sides.

pub mod context;
pub mod objective;
pub mod partition;
pub mod single;
pub mod weighted;
pub mod win_probability;

// Re-export commonly used types
pub use context::{check_candidate_count, BalanceContext, Candidate, PairTable};
pub use objective::{
    raw_scores, side_average_gap, Direction, MetricColumns, Objective, PartitionResult, ScoreCard,
};
pub use partition::{Partition, PartitionIter, TeamPartitionEnumerator};
pub use single::{Selection, SingleObjectiveBalancer};
pub use weighted::{
    normalize_scores, MultiObjectiveScorer, ScoredPartition, WeightVector, WeightedSelector,
};
pub use win_probability::{TeamRating, WinProbability, WinProbabilityEstimator};
