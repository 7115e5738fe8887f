//! Weighted multi-objective balancing
//!
//! Every partition gets six raw scores. Each score is rescaled to `[0, 1]`
//! over the whole partition set so that 1 is always the most desirable
//! value, and the weighted sum of the rescaled scores picks the winner.

use crate::balance::context::BalanceContext;
use crate::balance::objective::{
    raw_scores, Direction, MetricColumns, Objective, PartitionResult, ScoreCard,
};
use crate::balance::partition::Partition;
use crate::error::{BalancerError, Result};
use crate::types::Side;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative importance of each objective
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightVector {
    pub skill: f64,
    pub experience: f64,
    pub novelty: f64,
    pub reunion: f64,
    pub win_rate: f64,
    pub randomness: f64,
}

impl WeightVector {
    /// All weight on one objective
    pub fn only(objective: Objective) -> Self {
        let mut weights = Self::default();
        weights.set(objective, 100.0);
        weights
    }

    pub fn equal() -> Self {
        Self {
            skill: 1.0,
            experience: 1.0,
            novelty: 1.0,
            reunion: 1.0,
            win_rate: 1.0,
            randomness: 1.0,
        }
    }

    pub fn get(&self, objective: Objective) -> f64 {
        match objective {
            Objective::Skill => self.skill,
            Objective::Experience => self.experience,
            Objective::Novelty => self.novelty,
            Objective::Reunion => self.reunion,
            Objective::WinRate => self.win_rate,
            Objective::Random => self.randomness,
        }
    }

    pub fn set(&mut self, objective: Objective, value: f64) {
        match objective {
            Objective::Skill => self.skill = value,
            Objective::Experience => self.experience = value,
            Objective::Novelty => self.novelty = value,
            Objective::Reunion => self.reunion = value,
            Objective::WinRate => self.win_rate = value,
            Objective::Random => self.randomness = value,
        }
    }

    /// Weights must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for objective in Objective::ALL {
            let weight = self.get(objective);
            if !weight.is_finite() || weight < 0.0 {
                return Err(BalancerError::InvalidWeights {
                    reason: format!(
                        "{} weight must be a non-negative number, got {}",
                        objective, weight
                    ),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Weights rescaled to sum to 1; an all-zero vector becomes equal weights
    pub fn normalized(&self) -> ScoreCard {
        let total: f64 = Objective::ALL.iter().map(|&o| self.get(o)).sum();
        let mut card = ScoreCard::default();
        for objective in Objective::ALL {
            let weight = if total > 0.0 {
                self.get(objective) / total
            } else {
                1.0 / Objective::ALL.len() as f64
            };
            card.set(objective, weight);
        }
        card
    }
}

/// A partition with its raw and normalized scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPartition {
    pub partition: Partition,
    pub raw: ScoreCard,
    pub normalized: ScoreCard,
}

/// Rescale each objective to `[0, 1]` across `raw`
///
/// Minimize-type objectives map the smallest raw value to 1, maximize-type
/// objectives the largest. An objective with no spread scores 1 everywhere.
pub fn normalize_scores(raw: &[ScoreCard]) -> Vec<ScoreCard> {
    let mut bounds = [(f64::INFINITY, f64::NEG_INFINITY); 6];
    for card in raw {
        for (slot, (_, value)) in bounds.iter_mut().zip(card.iter()) {
            slot.0 = slot.0.min(value);
            slot.1 = slot.1.max(value);
        }
    }

    raw.iter()
        .map(|card| {
            let mut normalized = ScoreCard::default();
            for (&(min, max), (objective, value)) in bounds.iter().zip(card.iter()) {
                let score = if max == min {
                    1.0
                } else {
                    match objective.direction() {
                        Direction::Minimize => (max - value) / (max - min),
                        Direction::Maximize => (value - min) / (max - min),
                    }
                };
                normalized.set(objective, score.clamp(0.0, 1.0));
            }
            normalized
        })
        .collect()
}

/// Computes raw and normalized scores for every partition of a context
pub struct MultiObjectiveScorer<'a> {
    context: &'a BalanceContext,
    parallel_threshold: usize,
}

impl<'a> MultiObjectiveScorer<'a> {
    pub fn new(context: &'a BalanceContext, parallel_threshold: usize) -> Self {
        Self {
            context,
            parallel_threshold,
        }
    }

    /// Raw scores in enumeration order
    ///
    /// One uniform draw per partition is taken from `rng` before scoring, so
    /// the result does not depend on whether scoring ran in parallel.
    pub fn raw_scores<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<(Partition, ScoreCard)> {
        let partitions: Vec<Partition> = self.context.enumerator().enumerate().collect();
        let draws: Vec<f64> = partitions.iter().map(|_| rng.gen::<f64>()).collect();
        let columns = MetricColumns::from_context(self.context);
        let context = self.context;

        let score = |(partition, draw): (&Partition, &f64)| {
            (*partition, raw_scores(context, &columns, partition, *draw))
        };

        if partitions.len() >= self.parallel_threshold {
            partitions.par_iter().zip(draws.par_iter()).map(score).collect()
        } else {
            partitions.iter().zip(draws.iter()).map(score).collect()
        }
    }

    /// Raw and normalized scores in enumeration order
    pub fn score<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ScoredPartition> {
        let raw = self.raw_scores(rng);
        let cards: Vec<ScoreCard> = raw.iter().map(|(_, card)| *card).collect();
        let normalized = normalize_scores(&cards);
        raw.into_iter()
            .zip(normalized)
            .map(|((partition, raw), normalized)| ScoredPartition {
                partition,
                raw,
                normalized,
            })
            .collect()
    }
}

/// Picks the partition with the highest weighted normalized score
pub struct WeightedSelector;

impl WeightedSelector {
    /// Weighted score of one partition under already-normalized weights
    pub fn weighted_score(normalized: &ScoreCard, weights: &ScoreCard) -> f64 {
        Objective::ALL
            .iter()
            .map(|&o| weights.get(o) * normalized.get(o))
            .sum()
    }

    /// Index and score of the best partition; ties go to the earliest one
    pub fn select(scored: &[ScoredPartition], weights: &WeightVector) -> Result<(usize, f64)> {
        weights.validate()?;
        let weights = weights.normalized();

        let mut best: Option<(usize, f64)> = None;
        for (index, entry) in scored.iter().enumerate() {
            let score = Self::weighted_score(&entry.normalized, &weights);
            match best {
                Some((_, incumbent)) if score <= incumbent => {}
                _ => best = Some((index, score)),
            }
        }

        best.ok_or_else(|| {
            BalancerError::InternalError {
                message: "no partitions to select from".to_string(),
            }
            .into()
        })
    }

    /// Score every partition of `context` and describe the best one
    pub fn balance<R: Rng + ?Sized>(
        context: &BalanceContext,
        weights: &WeightVector,
        parallel_threshold: usize,
        rng: &mut R,
    ) -> Result<PartitionResult> {
        weights.validate()?;
        let scored = MultiObjectiveScorer::new(context, parallel_threshold).score(rng);
        let (index, score) = Self::select(&scored, weights)?;
        let chosen = &scored[index];

        debug!(
            "Weighted balance over {} candidates: best score {:.4} at partition {} of {}",
            context.len(),
            score,
            index,
            scored.len()
        );

        Ok(PartitionResult {
            side1_ids: context.ids_on(&chosen.partition, Side::One),
            side2_ids: context.ids_on(&chosen.partition, Side::Two),
            objective_label: "weighted".to_string(),
            raw_scores: chosen.raw.to_map(),
            normalized_scores: chosen.normalized.to_map(),
            weighted_score: Some(score),
            partitions_evaluated: scored.len() as u64,
        })
    }
}
