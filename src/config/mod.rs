//! Configuration management for the team balancer
//!
//! This module handles all configuration loading from environment variables
//! and TOML files, validation, and default values.

pub mod app;
pub mod balancer;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use balancer::{BalancerConfig, NEVER_PAIRED_DAYS};
pub use rating::RatingConfig;
