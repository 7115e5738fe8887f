//! Durable storage interfaces for players and matches
//!
//! The core only talks to these traits. In-memory implementations back the
//! CLI and the tests; a JSON dataset format is provided for import/export.

pub mod dataset;
pub mod memory;
pub mod repository;

// Re-export commonly used types
pub use dataset::{Dataset, DatasetMatch, DatasetParticipation};
pub use memory::{InMemoryMatchRepository, InMemoryPlayerRepository};
pub use repository::{load_history, MatchRecord, MatchRepository, PlayerRepository};
