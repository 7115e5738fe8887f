//! Repository traits consumed by the rating engine and relationship analyzer

use crate::error::Result;
use crate::types::{Match, MatchId, MatchParticipation, Player, PlayerId};
use async_trait::async_trait;

/// Storage for player records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Get a player by id
    async fn get(&self, player_id: &str) -> Result<Option<Player>>;

    /// Get every stored player, ordered by id
    async fn get_all(&self) -> Result<Vec<Player>>;

    /// Store or replace a player; durable once this returns
    async fn put(&self, player: Player) -> Result<()>;

    /// Store several players atomically: either all are written or none
    async fn put_all(&self, players: Vec<Player>) -> Result<()>;

    /// Remove every player
    async fn clear(&self) -> Result<()>;
}

/// Storage for recorded matches and their participations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Get every match in insertion order
    async fn get_all(&self) -> Result<Vec<Match>>;

    /// Get a match by id
    async fn get(&self, match_id: MatchId) -> Result<Option<Match>>;

    /// Get the participations recorded for a match
    async fn get_participations(&self, match_id: MatchId) -> Result<Vec<MatchParticipation>>;

    /// Store a new match with its participations
    async fn insert(&self, record: Match, participations: Vec<MatchParticipation>) -> Result<()>;

    /// Delete a match and its participations, returning whether it existed
    async fn delete(&self, match_id: MatchId) -> Result<bool>;

    /// Remove every match
    async fn clear(&self) -> Result<()>;
}

/// A match together with its participations
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub record: Match,
    pub participations: Vec<MatchParticipation>,
}

impl MatchRecord {
    /// Player ids on the given side, in participation order
    pub fn side_members(&self, side: crate::types::Side) -> Vec<&PlayerId> {
        self.participations
            .iter()
            .filter(|p| p.side == side)
            .map(|p| &p.player_id)
            .collect()
    }
}

/// Load every match with its participations, in insertion order
pub async fn load_history(matches: &dyn MatchRepository) -> Result<Vec<MatchRecord>> {
    let all = matches.get_all().await?;
    let mut history = Vec::with_capacity(all.len());
    for record in all {
        let participations = matches.get_participations(record.id).await?;
        history.push(MatchRecord {
            record,
            participations,
        });
    }
    Ok(history)
}
