//! Symmetric pair matrices

use crate::types::PlayerId;
use crate::utils::days_between;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unordered pair of distinct players, stored in ascending id order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey(PlayerId, PlayerId);

impl PairKey {
    /// Build the canonical key; `None` when both ids are the same player
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self(a.to_string(), b.to_string())),
            std::cmp::Ordering::Greater => Some(Self(b.to_string(), a.to_string())),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }
}

/// Number of matches each pair spent on the same side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamiliarityMatrix {
    counts: HashMap<PairKey, u32>,
}

impl FamiliarityMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more shared match for `a` and `b`
    pub fn increment(&mut self, a: &str, b: &str) {
        if let Some(key) = PairKey::new(a, b) {
            *self.counts.entry(key).or_insert(0) += 1;
        }
    }

    /// Shared-side count, 0 for pairs that never teamed up
    pub fn get(&self, a: &str, b: &str) -> u32 {
        PairKey::new(a, b)
            .and_then(|key| self.counts.get(&key).copied())
            .unwrap_or(0)
    }

    /// Pairs with a non-zero count
    pub fn pairs(&self) -> impl Iterator<Item = (&PairKey, u32)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Most recent date each pair shared a side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecencyMatrix {
    last_shared: HashMap<PairKey, DateTime<Utc>>,
}

impl RecencyMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a shared date unless a later one is already known
    pub fn observe(&mut self, a: &str, b: &str, at: DateTime<Utc>) {
        if let Some(key) = PairKey::new(a, b) {
            self.last_shared
                .entry(key)
                .and_modify(|current| {
                    if at > *current {
                        *current = at;
                    }
                })
                .or_insert(at);
        }
    }

    /// Last shared date; `None` means the pair never shared a side
    pub fn last_shared(&self, a: &str, b: &str) -> Option<DateTime<Utc>> {
        PairKey::new(a, b).and_then(|key| self.last_shared.get(&key).copied())
    }

    /// Days since the pair last shared a side, or `never_days` if they never did
    pub fn days_since(&self, a: &str, b: &str, now: DateTime<Utc>, never_days: f64) -> f64 {
        match self.last_shared(a, b) {
            Some(at) => days_between(at, now),
            None => never_days,
        }
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&PairKey, DateTime<Utc>)> {
        self.last_shared.iter().map(|(key, at)| (key, *at))
    }

    pub fn len(&self) -> usize {
        self.last_shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_shared.is_empty()
    }
}
