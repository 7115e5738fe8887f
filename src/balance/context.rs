//! Candidate set prepared for partition search
//!
//! Candidates are sorted by id so enumeration order, and with it every
//! tie-break, depends only on the set of players. Pairwise statistics are
//! copied once into dense index-addressed tables.

use crate::balance::partition::{Partition, TeamPartitionEnumerator};
use crate::config::BalancerConfig;
use crate::error::{BalancerError, Result};
use crate::relationships::{FamiliarityMatrix, RecencyMatrix};
use crate::types::{Player, PlayerId, PlayerRating, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-player inputs to balancing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: PlayerId,
    pub rating: PlayerRating,
    pub games_played: u32,
    pub wins: u32,
}

impl Candidate {
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games_played as f64
    }
}

impl From<&Player> for Candidate {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            rating: player.rating,
            games_played: player.games_played,
            wins: player.wins,
        }
    }
}

/// Dense symmetric table over candidate indices
#[derive(Debug, Clone, PartialEq)]
pub struct PairTable {
    size: usize,
    cells: Vec<f64>,
}

impl PairTable {
    /// Table of zeros
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
        }
    }

    /// Build from a function of index pairs `i < j`
    pub fn from_fn(size: usize, mut value: impl FnMut(usize, usize) -> f64) -> Self {
        let mut table = Self::new(size);
        for i in 0..size {
            for j in i + 1..size {
                table.set(i, j, value(i, j));
            }
        }
        table
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.size + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.cells[i * self.size + j] = value;
        self.cells[j * self.size + i] = value;
    }

    /// Sum of the table over all pairs inside `mask`
    pub fn sum_within(&self, mask: u64) -> f64 {
        let mut total = 0.0;
        let mut rest = mask;
        while rest != 0 {
            let i = rest.trailing_zeros() as usize;
            rest &= rest - 1;
            let row = &self.cells[i * self.size..(i + 1) * self.size];
            let mut others = rest;
            while others != 0 {
                let j = others.trailing_zeros() as usize;
                others &= others - 1;
                total += row[j];
            }
        }
        total
    }

    /// Sum over every same-side pair of a partition
    pub fn same_side_total(&self, partition: &Partition) -> f64 {
        self.sum_within(partition.side_one_mask()) + self.sum_within(partition.side_two_mask())
    }
}

/// Validated, canonically ordered candidates with their pairwise tables
#[derive(Debug, Clone)]
pub struct BalanceContext {
    candidates: Vec<Candidate>,
    familiarity: PairTable,
    recency_days: PairTable,
}

impl BalanceContext {
    /// Prepare a candidate set for balancing
    ///
    /// Rejects duplicate ids and candidate counts outside
    /// `config.min_players..=config.max_players`. Pairs that never shared a
    /// side get `config.never_paired_days` in the recency table.
    pub fn new(
        mut candidates: Vec<Candidate>,
        familiarity: &FamiliarityMatrix,
        recency: &RecencyMatrix,
        now: DateTime<Utc>,
        config: &BalancerConfig,
    ) -> Result<Self> {
        candidates.sort_by(|a, b| a.id.cmp(&b.id));

        let mut seen = HashSet::new();
        for candidate in &candidates {
            if !seen.insert(candidate.id.as_str()) {
                return Err(BalancerError::DuplicateCandidate {
                    player_id: candidate.id.clone(),
                }
                .into());
            }
        }
        check_candidate_count(candidates.len(), config)?;

        let size = candidates.len();
        let familiarity = PairTable::from_fn(size, |i, j| {
            familiarity.get(&candidates[i].id, &candidates[j].id) as f64
        });
        let recency_days = PairTable::from_fn(size, |i, j| {
            recency.days_since(
                &candidates[i].id,
                &candidates[j].id,
                now,
                config.never_paired_days,
            )
        });

        Ok(Self {
            candidates,
            familiarity,
            recency_days,
        })
    }

    /// Candidates with no shared history at all
    pub fn without_history(candidates: Vec<Candidate>, config: &BalancerConfig) -> Result<Self> {
        Self::new(
            candidates,
            &FamiliarityMatrix::new(),
            &RecencyMatrix::new(),
            Utc::now(),
            config,
        )
    }

    /// Candidates in canonical (id) order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn familiarity(&self) -> &PairTable {
        &self.familiarity
    }

    pub fn recency_days(&self) -> &PairTable {
        &self.recency_days
    }

    pub fn enumerator(&self) -> TeamPartitionEnumerator {
        TeamPartitionEnumerator::new(self.candidates.len())
    }

    /// Per-candidate values in canonical order
    pub fn values(&self, metric: impl Fn(&Candidate) -> f64) -> Vec<f64> {
        self.candidates.iter().map(metric).collect()
    }

    /// Player ids on one side of a partition
    pub fn ids_on(&self, partition: &Partition, side: Side) -> Vec<PlayerId> {
        partition
            .members(side)
            .map(|i| self.candidates[i].id.clone())
            .collect()
    }

    /// Ratings on one side of a partition
    pub fn ratings_on(&self, partition: &Partition, side: Side) -> Vec<PlayerRating> {
        partition
            .members(side)
            .map(|i| self.candidates[i].rating)
            .collect()
    }
}

/// Reject candidate counts outside the configured enumeration bounds
pub fn check_candidate_count(count: usize, config: &BalancerConfig) -> Result<()> {
    if count < config.min_players {
        return Err(BalancerError::InsufficientPlayers {
            count,
            minimum: config.min_players,
        }
        .into());
    }
    if count > config.max_players {
        return Err(BalancerError::TooManyCandidates {
            count,
            maximum: config.max_players,
        }
        .into());
    }
    Ok(())
}
