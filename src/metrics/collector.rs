//! Metrics collection using Prometheus
//!
//! Counters and histograms for rating updates and team balancing.

use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector for the rating engine and balancers
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Rating-related metrics
    rating_metrics: RatingMetrics,

    /// Balancing metrics
    balance_metrics: BalanceMetrics,
}

/// Rating-related metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Matches applied to ratings
    pub matches_recorded_total: IntCounter,

    /// Full rating recomputes
    pub recomputes_total: IntCounter,

    /// Recomputes that aborted
    pub recompute_failures_total: IntCounter,

    /// Players with a rating record
    pub rated_players: IntGauge,
}

/// Balancing metrics
#[derive(Clone)]
pub struct BalanceMetrics {
    /// Balance requests by objective
    pub requests_total: IntCounterVec,

    /// Partitions scored
    pub partitions_evaluated_total: IntCounter,

    /// Time spent per balance request
    pub balance_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let rating_metrics = RatingMetrics::new(&registry)?;
        let balance_metrics = BalanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            rating_metrics,
            balance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn rating(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    pub fn balance(&self) -> &BalanceMetrics {
        &self.balance_metrics
    }

    /// Record a match applied to ratings
    pub fn record_match(&self) {
        self.rating_metrics.matches_recorded_total.inc();
    }

    /// Record the outcome of a full recompute
    pub fn record_recompute(&self, success: bool) {
        self.rating_metrics.recomputes_total.inc();
        if !success {
            self.rating_metrics.recompute_failures_total.inc();
        }
    }

    pub fn set_rated_players(&self, count: usize) {
        self.rating_metrics.rated_players.set(count as i64);
    }

    /// Record a finished balance request
    pub fn record_balance(&self, objective: &str, partitions: u64, duration: Duration) {
        self.balance_metrics
            .requests_total
            .with_label_values(&[objective])
            .inc();
        self.balance_metrics
            .partitions_evaluated_total
            .inc_by(partitions);
        self.balance_metrics
            .balance_duration
            .with_label_values(&[objective])
            .observe(duration.as_secs_f64());
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        Ok(encoder.encode_to_string(&metric_families)?)
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let matches_recorded_total = IntCounter::new(
            "team_balancer_matches_recorded_total",
            "Matches applied to player ratings",
        )?;
        registry.register(Box::new(matches_recorded_total.clone()))?;

        let recomputes_total = IntCounter::new(
            "team_balancer_recomputes_total",
            "Full rating recomputes from history",
        )?;
        registry.register(Box::new(recomputes_total.clone()))?;

        let recompute_failures_total = IntCounter::new(
            "team_balancer_recompute_failures_total",
            "Rating recomputes aborted before commit",
        )?;
        registry.register(Box::new(recompute_failures_total.clone()))?;

        let rated_players =
            IntGauge::new("team_balancer_rated_players", "Players with a rating record")?;
        registry.register(Box::new(rated_players.clone()))?;

        Ok(Self {
            matches_recorded_total,
            recomputes_total,
            recompute_failures_total,
            rated_players,
        })
    }
}

impl BalanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new(
                "team_balancer_balance_requests_total",
                "Balance requests by objective",
            ),
            &["objective"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let partitions_evaluated_total = IntCounter::new(
            "team_balancer_partitions_evaluated_total",
            "Partitions scored across all balance requests",
        )?;
        registry.register(Box::new(partitions_evaluated_total.clone()))?;

        let balance_duration = HistogramVec::new(
            HistogramOpts::new(
                "team_balancer_balance_duration_seconds",
                "Time spent selecting a partition",
            )
            .buckets(vec![0.0001, 0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["objective"],
        )?;
        registry.register(Box::new(balance_duration.clone()))?;

        Ok(Self {
            requests_total,
            partitions_evaluated_total,
            balance_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        let _rating = collector.rating();
        let _balance = collector.balance();
    }

    #[test]
    fn test_rating_counters() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_match();
        collector.record_match();
        collector.record_recompute(true);
        collector.record_recompute(false);
        collector.set_rated_players(12);

        assert_eq!(collector.rating().matches_recorded_total.get(), 2);
        assert_eq!(collector.rating().recomputes_total.get(), 2);
        assert_eq!(collector.rating().recompute_failures_total.get(), 1);
        assert_eq!(collector.rating().rated_players.get(), 12);
    }

    #[test]
    fn test_balance_recording_and_export() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_balance("skill", 6, Duration::from_millis(2));
        collector.record_balance("weighted", 70, Duration::from_millis(5));

        assert_eq!(
            collector
                .balance()
                .requests_total
                .with_label_values(&["skill"])
                .get(),
            1
        );
        assert_eq!(collector.balance().partitions_evaluated_total.get(), 76);

        let text = collector.export().unwrap();
        assert!(text.contains("team_balancer_balance_requests_total"));
        assert!(text.contains("objective=\"weighted\""));
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();

        assert!(duration >= Duration::from_millis(10));

        let final_duration = timer.stop();
        assert!(final_duration >= Duration::from_millis(10));
    }
}
