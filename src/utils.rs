//! Utility functions for the team balancer

use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Mean of a slice, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Absolute gap between the averages `sum1 / count1` and `sum2 / count2`
///
/// Computed over a common denominator so that equal gaps produce bitwise
/// equal results regardless of the individual sums.
pub fn average_gap(sum1: f64, count1: usize, sum2: f64, count2: usize) -> f64 {
    if count1 == 0 || count2 == 0 {
        return 0.0;
    }
    let (c1, c2) = (count1 as f64, count2 as f64);
    (sum1 * c2 - sum2 * c1).abs() / (c1 * c2)
}

/// Binomial coefficient C(n, k), saturating on overflow
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u64 = 1;
    for i in 0..k {
        result = result.saturating_mul((n - i) as u64) / (i as u64 + 1);
    }
    result
}

/// Fractional days elapsed between `earlier` and `later`, never negative
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let seconds = (later - earlier).num_seconds().max(0) as f64;
    seconds / 86_400.0
}
