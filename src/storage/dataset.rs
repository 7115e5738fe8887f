//! JSON dataset format used to import and export league history

use crate::error::Result;
use crate::storage::repository::{load_history, MatchRepository, PlayerRepository};
use crate::types::{Match, MatchParticipation, Player, PlayerId, Side};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Participation entry inside a dataset match; the match id is implied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetParticipation {
    pub player_id: PlayerId,
    pub side: Side,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub counters: BTreeMap<String, i64>,
}

/// A match with its participations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMatch {
    #[serde(rename = "match")]
    pub record: Match,
    pub participations: Vec<DatasetParticipation>,
}

/// Players and matches in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<DatasetMatch>,
}

impl Dataset {
    /// Read a dataset from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse dataset {}", path.display()))
    }

    /// Write the dataset as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write dataset {}", path.display()))
    }

    /// Store every player and match into the repositories, preserving match order
    pub async fn load_into(
        &self,
        players: &dyn PlayerRepository,
        matches: &dyn MatchRepository,
    ) -> Result<()> {
        players.put_all(self.players.clone()).await?;
        for entry in &self.matches {
            let participations = entry
                .participations
                .iter()
                .map(|p| MatchParticipation {
                    match_id: entry.record.id,
                    player_id: p.player_id.clone(),
                    side: p.side,
                    counters: p.counters.clone(),
                })
                .collect();
            matches.insert(entry.record.clone(), participations).await?;
        }
        info!(
            "Loaded dataset with {} players and {} matches",
            self.players.len(),
            self.matches.len()
        );
        Ok(())
    }

    /// Snapshot the current repository contents
    pub async fn capture(
        players: &dyn PlayerRepository,
        matches: &dyn MatchRepository,
    ) -> Result<Self> {
        let players = players.get_all().await?;
        let matches = load_history(matches)
            .await?
            .into_iter()
            .map(|entry| DatasetMatch {
                record: entry.record,
                participations: entry
                    .participations
                    .into_iter()
                    .map(|p| DatasetParticipation {
                        player_id: p.player_id,
                        side: p.side,
                        counters: p.counters,
                    })
                    .collect(),
            })
            .collect();
        Ok(Self { players, matches })
    }
}
