//! Metrics for the team balancer
//!
//! Prometheus counters and histograms for rating updates and balancing.

pub mod collector;

pub use collector::{BalanceMetrics, MetricsCollector, MetricsTimer, RatingMetrics};
