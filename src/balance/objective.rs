//! Balancing objectives and per-partition raw scores

use crate::balance::context::BalanceContext;
use crate::balance::partition::Partition;
use crate::types::PlayerId;
use crate::utils::average_gap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which way an objective's raw score is better
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// The six balancing criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Average rating difference between sides
    Skill,
    /// Average games-played difference between sides
    Experience,
    /// Same-side familiarity total
    Novelty,
    /// Same-side days-since-teamed total
    Reunion,
    /// Average win-rate difference between sides
    WinRate,
    /// Uniform random draw
    Random,
}

impl Objective {
    pub const ALL: [Objective; 6] = [
        Objective::Skill,
        Objective::Experience,
        Objective::Novelty,
        Objective::Reunion,
        Objective::WinRate,
        Objective::Random,
    ];

    pub fn direction(&self) -> Direction {
        match self {
            Objective::Skill | Objective::Experience | Objective::Novelty | Objective::WinRate => {
                Direction::Minimize
            }
            Objective::Reunion | Objective::Random => Direction::Maximize,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Objective::Skill => "skill",
            Objective::Experience => "experience",
            Objective::Novelty => "novelty",
            Objective::Reunion => "reunion",
            Objective::WinRate => "win_rate",
            Objective::Random => "random",
        }
    }

    fn index(&self) -> usize {
        match self {
            Objective::Skill => 0,
            Objective::Experience => 1,
            Objective::Novelty => 2,
            Objective::Reunion => 3,
            Objective::WinRate => 4,
            Objective::Random => 5,
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "skill" => Ok(Objective::Skill),
            "experience" => Ok(Objective::Experience),
            "novelty" => Ok(Objective::Novelty),
            "reunion" => Ok(Objective::Reunion),
            "win_rate" | "winrate" => Ok(Objective::WinRate),
            "random" | "randomness" => Ok(Objective::Random),
            other => Err(format!("unknown objective '{}'", other)),
        }
    }
}

/// One value per objective
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreCard([f64; 6]);

impl ScoreCard {
    pub fn new(values: [f64; 6]) -> Self {
        Self(values)
    }

    pub fn get(&self, objective: Objective) -> f64 {
        self.0[objective.index()]
    }

    pub fn set(&mut self, objective: Objective, value: f64) {
        self.0[objective.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Objective, f64)> + '_ {
        Objective::ALL.iter().map(move |&o| (o, self.get(o)))
    }

    pub fn to_map(&self) -> BTreeMap<Objective, f64> {
        self.iter().collect()
    }
}

fn side_sum(values: &[f64], members: impl Iterator<Item = usize>) -> (f64, usize) {
    members.fold((0.0, 0), |(sum, count), i| (sum + values[i], count + 1))
}

/// Gap between the two sides' averages of `values`
pub fn side_average_gap(values: &[f64], partition: &Partition) -> f64 {
    let (sum1, count1) = side_sum(values, partition.side_one());
    let (sum2, count2) = side_sum(values, partition.side_two());
    average_gap(sum1, count1, sum2, count2)
}

/// Per-candidate metric columns, computed once per context
#[derive(Debug, Clone)]
pub struct MetricColumns {
    pub skill: Vec<f64>,
    pub experience: Vec<f64>,
    pub win_rate: Vec<f64>,
}

impl MetricColumns {
    pub fn from_context(context: &BalanceContext) -> Self {
        Self {
            skill: context.values(|c| c.rating.rating),
            experience: context.values(|c| c.games_played as f64),
            win_rate: context.values(|c| c.win_rate()),
        }
    }
}

/// Raw scores of one partition; the random slot is filled with `random_draw`
pub fn raw_scores(
    context: &BalanceContext,
    columns: &MetricColumns,
    partition: &Partition,
    random_draw: f64,
) -> ScoreCard {
    ScoreCard([
        side_average_gap(&columns.skill, partition),
        side_average_gap(&columns.experience, partition),
        context.familiarity().same_side_total(partition),
        context.recency_days().same_side_total(partition),
        side_average_gap(&columns.win_rate, partition),
        random_draw,
    ])
}

/// Outcome of a balance request, ready for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionResult {
    pub side1_ids: Vec<PlayerId>,
    pub side2_ids: Vec<PlayerId>,
    pub objective_label: String,
    pub raw_scores: BTreeMap<Objective, f64>,
    pub normalized_scores: BTreeMap<Objective, f64>,
    pub weighted_score: Option<f64>,
    pub partitions_evaluated: u64,
}
