//! In-memory repository implementations

use crate::error::{BalancerError, Result};
use crate::storage::repository::{MatchRepository, PlayerRepository};
use crate::types::{Match, MatchId, MatchParticipation, Player, PlayerId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

fn read_lock<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| {
        BalancerError::InternalError {
            message: format!("Failed to acquire {} read lock", what),
        }
        .into()
    })
}

fn write_lock<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| {
        BalancerError::InternalError {
            message: format!("Failed to acquire {} write lock", what),
        }
        .into()
    })
}

/// In-memory player storage, ordered by player id
#[derive(Debug, Default)]
pub struct InMemoryPlayerRepository {
    players: RwLock<BTreeMap<PlayerId, Player>>,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with players
    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        Self {
            players: RwLock::new(players.into_iter().map(|p| (p.id.clone(), p)).collect()),
        }
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn get(&self, player_id: &str) -> Result<Option<Player>> {
        let players = read_lock(&self.players, "players")?;
        Ok(players.get(player_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Player>> {
        let players = read_lock(&self.players, "players")?;
        Ok(players.values().cloned().collect())
    }

    async fn put(&self, player: Player) -> Result<()> {
        let mut players = write_lock(&self.players, "players")?;
        players.insert(player.id.clone(), player);
        Ok(())
    }

    async fn put_all(&self, entries: Vec<Player>) -> Result<()> {
        let mut players = write_lock(&self.players, "players")?;
        for player in entries {
            players.insert(player.id.clone(), player);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        write_lock(&self.players, "players")?.clear();
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredMatch {
    record: Match,
    participations: Vec<MatchParticipation>,
}

/// In-memory match storage preserving insertion order
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    matches: RwLock<Vec<StoredMatch>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored matches
    pub fn len(&self) -> usize {
        self.matches.read().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn get_all(&self) -> Result<Vec<Match>> {
        let matches = read_lock(&self.matches, "matches")?;
        Ok(matches.iter().map(|m| m.record.clone()).collect())
    }

    async fn get(&self, match_id: MatchId) -> Result<Option<Match>> {
        let matches = read_lock(&self.matches, "matches")?;
        Ok(matches
            .iter()
            .find(|m| m.record.id == match_id)
            .map(|m| m.record.clone()))
    }

    async fn get_participations(&self, match_id: MatchId) -> Result<Vec<MatchParticipation>> {
        let matches = read_lock(&self.matches, "matches")?;
        Ok(matches
            .iter()
            .find(|m| m.record.id == match_id)
            .map(|m| m.participations.clone())
            .unwrap_or_default())
    }

    async fn insert(&self, record: Match, participations: Vec<MatchParticipation>) -> Result<()> {
        let mut matches = write_lock(&self.matches, "matches")?;
        if matches.iter().any(|m| m.record.id == record.id) {
            return Err(BalancerError::InvalidMatch {
                reason: format!("Match {} is already recorded", record.id),
            }
            .into());
        }
        matches.push(StoredMatch {
            record,
            participations,
        });
        Ok(())
    }

    async fn delete(&self, match_id: MatchId) -> Result<bool> {
        let mut matches = write_lock(&self.matches, "matches")?;
        let before = matches.len();
        matches.retain(|m| m.record.id != match_id);
        Ok(matches.len() != before)
    }

    async fn clear(&self) -> Result<()> {
        write_lock(&self.matches, "matches")?.clear();
        Ok(())
    }
}
