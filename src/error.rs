//! Error types for the team balancer
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Domain failures are raised as `BalancerError`
//! values and can be recovered with `downcast_ref`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific balancing and rating scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BalancerError {
    #[error("Not enough players to form teams: {count} given, at least {minimum} required")]
    InsufficientPlayers { count: usize, minimum: usize },

    #[error("Too many players to enumerate: {count} given, at most {maximum} allowed")]
    TooManyCandidates { count: usize, maximum: usize },

    #[error("Player listed more than once: {player_id}")]
    DuplicateCandidate { player_id: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("Invalid match: {reason}")]
    InvalidMatch { reason: String },

    #[error("Invalid weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("Weight preset not found: {preset_id}")]
    PresetNotFound { preset_id: String },

    #[error("Invalid preset name: {reason}")]
    InvalidPresetName { reason: String },

    #[error("Repository failure: {message}")]
    RepositoryFailure { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl BalancerError {
    /// Extract a `BalancerError` from an `anyhow` error chain, if present
    pub fn find(error: &anyhow::Error) -> Option<&BalancerError> {
        error.chain().find_map(|cause| cause.downcast_ref())
    }
}
