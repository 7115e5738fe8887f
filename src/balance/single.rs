//! Exhaustive single-objective balancing

use crate::balance::context::{BalanceContext, Candidate, PairTable};
use crate::balance::objective::{
    raw_scores, side_average_gap, MetricColumns, Objective, PartitionResult,
};
use crate::balance::partition::Partition;
use crate::error::{BalancerError, Result};
use crate::types::Side;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// Best partition found by a single-objective search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub partition: Partition,
    pub score: f64,
    pub evaluated: u64,
}

/// Picks the best partition under one metric
///
/// Ties go to the first partition in enumeration order; a later partition
/// only replaces the incumbent when it is strictly better.
pub struct SingleObjectiveBalancer<'a> {
    context: &'a BalanceContext,
}

impl<'a> SingleObjectiveBalancer<'a> {
    pub fn new(context: &'a BalanceContext) -> Self {
        Self { context }
    }

    fn search(
        &self,
        score: impl Fn(&Partition) -> f64,
        better: impl Fn(f64, f64) -> bool,
    ) -> Result<Selection> {
        let mut best: Option<(Partition, f64)> = None;
        let mut evaluated = 0u64;

        for partition in self.context.enumerator().enumerate() {
            evaluated += 1;
            let value = score(&partition);
            match best {
                Some((_, incumbent)) if !better(value, incumbent) => {}
                _ => best = Some((partition, value)),
            }
        }

        let (partition, score) = best.ok_or_else(|| BalancerError::InternalError {
            message: format!("no partitions for {} candidates", self.context.len()),
        })?;
        Ok(Selection {
            partition,
            score,
            evaluated,
        })
    }

    /// Smallest gap between the sides' averages of `metric`
    pub fn minimize_average_difference(
        &self,
        metric: impl Fn(&Candidate) -> f64,
    ) -> Result<Selection> {
        let values = self.context.values(metric);
        self.search(|p| side_average_gap(&values, p), |a, b| a < b)
    }

    /// Smallest same-side total of `table`
    pub fn minimize_total_pairwise_sum(&self, table: &PairTable) -> Result<Selection> {
        self.search(|p| table.same_side_total(p), |a, b| a < b)
    }

    /// Largest same-side total of `table`
    pub fn maximize_total_pairwise_sum(&self, table: &PairTable) -> Result<Selection> {
        self.search(|p| table.same_side_total(p), |a, b| a > b)
    }

    /// Unbiased shuffle; no optimization involved
    pub fn random_split<R: Rng + ?Sized>(&self, rng: &mut R) -> Selection {
        let mut order: Vec<usize> = (0..self.context.len()).collect();
        order.shuffle(rng);
        let side_one_size = self.context.enumerator().side_one_size();
        Selection {
            partition: Partition::from_indices(&order[..side_one_size], self.context.len()),
            score: 0.0,
            evaluated: 1,
        }
    }

    /// Run the search for `objective` and describe the chosen split
    pub fn balance<R: Rng + ?Sized>(
        &self,
        objective: Objective,
        rng: &mut R,
    ) -> Result<PartitionResult> {
        let context = self.context;
        let selection = match objective {
            Objective::Skill => self.minimize_average_difference(|c| c.rating.rating)?,
            Objective::Experience => self.minimize_average_difference(|c| c.games_played as f64)?,
            Objective::WinRate => self.minimize_average_difference(Candidate::win_rate)?,
            Objective::Novelty => self.minimize_total_pairwise_sum(context.familiarity())?,
            Objective::Reunion => self.maximize_total_pairwise_sum(context.recency_days())?,
            Objective::Random => self.random_split(rng),
        };

        debug!(
            "{} balance over {} candidates: score {:.3} after {} partitions",
            objective,
            context.len(),
            selection.score,
            selection.evaluated
        );

        let columns = MetricColumns::from_context(context);
        let mut raw = raw_scores(context, &columns, &selection.partition, 0.0).to_map();
        raw.remove(&Objective::Random);

        Ok(PartitionResult {
            side1_ids: context.ids_on(&selection.partition, Side::One),
            side2_ids: context.ids_on(&selection.partition, Side::Two),
            objective_label: objective.label().to_string(),
            raw_scores: raw,
            normalized_scores: BTreeMap::new(),
            weighted_score: None,
            partitions_evaluated: selection.evaluated,
        })
    }
}
