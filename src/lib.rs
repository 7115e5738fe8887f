//! Team Balancer - match history, ratings and team formation
//!
//! This crate records results of two-sided games, maintains per-player
//! ratings with full-history replay, and splits a group of players into two
//! balanced sides under one objective or a weighted blend of six.

pub mod balance;
pub mod config;
pub mod error;
pub mod metrics;
pub mod presets;
pub mod rating;
pub mod relationships;
pub mod service;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{BalancerError, Result};
pub use types::*;

// Re-export key components
pub use balance::{Objective, PartitionResult, WeightVector, WinProbability};
pub use rating::RatingEngine;
pub use service::{BalanceRequest, LeagueService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
