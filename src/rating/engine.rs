//! Rating engine
//!
//! The `RatingEngine` is the only component that mutates ratings. It applies
//! single results incrementally and can rebuild every player from scratch by
//! replaying the stored history in chronological order. All mutations are
//! serialized through a single writer lock and committed with one atomic
//! `put_all`, so a failed operation leaves stored players untouched.

use crate::config::RatingConfig;
use crate::error::{BalancerError, Result};
use crate::rating::calculator::RatingCalculator;
use crate::rating::elo::TeamEloCalculator;
use crate::storage::repository::{load_history, MatchRepository, PlayerRepository};
use crate::types::{
    Match, MatchId, MatchParticipation, Player, PlayerId, PlayerStats, RatingChange, Side,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Outcome of a full recomputation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeSummary {
    pub players_reset: usize,
    pub matches_replayed: usize,
}

/// Check that participations describe a valid two-sided match
///
/// Every row must reference `record`, no player may appear twice and both
/// sides need at least one player.
pub fn validate_participations(record: &Match, participations: &[MatchParticipation]) -> Result<()> {
    let mut seen = HashSet::new();
    for participation in participations {
        if participation.match_id != record.id {
            return Err(BalancerError::InvalidMatch {
                reason: format!(
                    "Participation of {} references match {} instead of {}",
                    participation.player_id, participation.match_id, record.id
                ),
            }
            .into());
        }
        if !seen.insert(participation.player_id.as_str()) {
            return Err(BalancerError::InvalidMatch {
                reason: format!(
                    "Player {} appears more than once in match {}",
                    participation.player_id, record.id
                ),
            }
            .into());
        }
    }

    for side in [Side::One, Side::Two] {
        if !participations.iter().any(|p| p.side == side) {
            return Err(BalancerError::InvalidMatch {
                reason: format!("{} of match {} has no players", side, record.id),
            }
            .into());
        }
    }

    Ok(())
}

/// Authoritative owner of player ratings and results
pub struct RatingEngine {
    players: Arc<dyn PlayerRepository>,
    matches: Arc<dyn MatchRepository>,
    calculator: Arc<dyn RatingCalculator>,
    config: RatingConfig,
    writer: Mutex<()>,
}

impl RatingEngine {
    /// Create an engine using the team Elo calculator
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        matches: Arc<dyn MatchRepository>,
        config: RatingConfig,
    ) -> Result<Self> {
        let calculator = Arc::new(TeamEloCalculator::new(config.clone())?);
        Ok(Self::with_calculator(players, matches, calculator, config))
    }

    /// Create an engine with a custom rating calculator
    pub fn with_calculator(
        players: Arc<dyn PlayerRepository>,
        matches: Arc<dyn MatchRepository>,
        calculator: Arc<dyn RatingCalculator>,
        config: RatingConfig,
    ) -> Self {
        Self {
            players,
            matches,
            calculator,
            config,
            writer: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Create default players for ids that have no record yet
    ///
    /// Returns the ids that were created.
    pub async fn ensure_players(&self, player_ids: &[PlayerId]) -> Result<Vec<PlayerId>> {
        let _guard = self.writer.lock().await;
        self.register_missing(player_ids).await
    }

    async fn register_missing(&self, player_ids: &[PlayerId]) -> Result<Vec<PlayerId>> {
        let mut created = Vec::new();
        for player_id in player_ids {
            if created.contains(player_id) || self.players.get(player_id).await?.is_some() {
                continue;
            }
            created.push(player_id.clone());
        }

        if !created.is_empty() {
            let initial = self.calculator.get_initial_rating();
            let new_players = created
                .iter()
                .map(|id| Player::new(id.clone(), initial))
                .collect();
            self.players.put_all(new_players).await?;
            info!("Registered {} new players: {:?}", created.len(), created);
        }

        Ok(created)
    }

    /// Apply one match result to the participating players
    ///
    /// Fails with `PlayerNotFound` if a participant has no record; callers
    /// must register players beforehand. Nothing is written on failure.
    pub async fn record_match(
        &self,
        record: &Match,
        participations: &[MatchParticipation],
    ) -> Result<Vec<RatingChange>> {
        validate_participations(record, participations)?;
        let _guard = self.writer.lock().await;
        self.rate_match(record, participations).await
    }

    /// Store a new result and rate it
    ///
    /// Unknown participants are registered with the initial rating first.
    pub async fn record_result(
        &self,
        record: Match,
        participations: Vec<MatchParticipation>,
    ) -> Result<Vec<RatingChange>> {
        validate_participations(&record, &participations)?;
        let _guard = self.writer.lock().await;
        if self.matches.get(record.id).await?.is_some() {
            warn!("Rejected duplicate result for match {}", record.id);
            return Err(BalancerError::InvalidMatch {
                reason: format!("Match {} is already recorded", record.id),
            }
            .into());
        }

        let ids: Vec<PlayerId> = participations
            .iter()
            .map(|p| p.player_id.clone())
            .collect();
        self.register_missing(&ids).await?;
        self.matches
            .insert(record.clone(), participations.clone())
            .await?;
        self.rate_match(&record, &participations).await
    }

    /// Delete a stored match and rebuild ratings from what remains
    ///
    /// The replay without the match runs before anything is removed. If it
    /// fails, the match stays stored and players are left untouched.
    pub async fn delete_match(&self, match_id: MatchId) -> Result<RecomputeSummary> {
        let _guard = self.writer.lock().await;
        let Some(record) = self.matches.get(match_id).await? else {
            warn!("Cannot delete unknown match {}", match_id);
            return Err(BalancerError::MatchNotFound {
                match_id: match_id.to_string(),
            }
            .into());
        };
        let participations = self.matches.get_participations(match_id).await?;

        let (roster, summary) = self.replay(Some(match_id)).await?;
        if !self.matches.delete(match_id).await? {
            return Err(BalancerError::InternalError {
                message: format!("Match {} disappeared during delete", match_id),
            }
            .into());
        }
        if let Err(e) = self.players.put_all(roster).await {
            error!("Restoring match {} after failed rating commit", match_id);
            self.matches.insert(record, participations).await?;
            return Err(e);
        }

        info!(
            "Deleted match {}: {} matches replayed",
            match_id, summary.matches_replayed
        );
        Ok(summary)
    }

    /// Remove every player and match
    pub async fn wipe(&self) -> Result<()> {
        let _guard = self.writer.lock().await;
        self.matches.clear().await?;
        self.players.clear().await?;
        warn!("Wiped all players and matches");
        Ok(())
    }

    async fn rate_match(
        &self,
        record: &Match,
        participations: &[MatchParticipation],
    ) -> Result<Vec<RatingChange>> {
        let mut roster = HashMap::with_capacity(participations.len());
        for participation in participations {
            let player = self
                .players
                .get(&participation.player_id)
                .await?
                .ok_or_else(|| BalancerError::PlayerNotFound {
                    player_id: participation.player_id.clone(),
                })?;
            roster.insert(player.id.clone(), player);
        }

        let changes = self.apply_match(&mut roster, record, participations)?;
        self.players.put_all(roster.into_values().collect()).await?;

        info!(
            "Recorded match {} ({} won, {} players)",
            record.id,
            record.winner,
            participations.len()
        );
        Ok(changes)
    }

    /// Reset every player and replay the whole match history
    ///
    /// Matches are replayed by ascending `played_at`; equal timestamps keep
    /// repository insertion order. A participation without a player record
    /// aborts the recompute with `PlayerNotFound` and nothing is written.
    pub async fn recompute_all(&self) -> Result<RecomputeSummary> {
        let _guard = self.writer.lock().await;
        self.replay_history().await
    }

    async fn replay_history(&self) -> Result<RecomputeSummary> {
        info!("Recomputing ratings from full match history");
        let (roster, summary) = self.replay(None).await?;
        self.players.put_all(roster).await?;

        info!(
            "Recompute finished: {} players reset, {} matches replayed",
            summary.players_reset, summary.matches_replayed
        );
        Ok(summary)
    }

    /// Replay history into fresh player records without writing them
    async fn replay(&self, skip: Option<MatchId>) -> Result<(Vec<Player>, RecomputeSummary)> {
        let initial = self.calculator.get_initial_rating();
        let mut roster: HashMap<PlayerId, Player> = self
            .players
            .get_all()
            .await?
            .into_iter()
            .map(|mut player| {
                player.reset(initial);
                (player.id.clone(), player)
            })
            .collect();
        let players_reset = roster.len();

        let mut history = load_history(self.matches.as_ref()).await?;
        history.retain(|entry| Some(entry.record.id) != skip);
        // Stable sort: insertion order breaks timestamp ties
        history.sort_by(|a, b| a.record.played_at.cmp(&b.record.played_at));

        for entry in &history {
            validate_participations(&entry.record, &entry.participations)?;
            if let Some(missing) = entry
                .participations
                .iter()
                .find(|p| !roster.contains_key(&p.player_id))
            {
                error!(
                    "Aborting recompute: match {} references unknown player {}",
                    entry.record.id, missing.player_id
                );
                return Err(BalancerError::PlayerNotFound {
                    player_id: missing.player_id.clone(),
                }
                .into());
            }
            self.apply_match(&mut roster, &entry.record, &entry.participations)?;
        }

        let summary = RecomputeSummary {
            players_reset,
            matches_replayed: history.len(),
        };
        Ok((roster.into_values().collect(), summary))
    }

    fn apply_match(
        &self,
        roster: &mut HashMap<PlayerId, Player>,
        record: &Match,
        participations: &[MatchParticipation],
    ) -> Result<Vec<RatingChange>> {
        let mut side_one = Vec::new();
        let mut side_two = Vec::new();
        for participation in participations {
            let player = roster.get(&participation.player_id).ok_or_else(|| {
                BalancerError::PlayerNotFound {
                    player_id: participation.player_id.clone(),
                }
            })?;
            let entry = (player.id.clone(), player.rating);
            match participation.side {
                Side::One => side_one.push(entry),
                Side::Two => side_two.push(entry),
            }
        }

        let result = self
            .calculator
            .calculate_rating_changes(&side_one, &side_two, record.winner)?;

        for change in &result.rating_changes {
            let player = roster.get_mut(&change.player_id).ok_or_else(|| {
                BalancerError::InternalError {
                    message: format!("Rating change for unknown player {}", change.player_id),
                }
            })?;
            player.rating = change.new_rating;
            player.games_played += 1;
            if change.won {
                player.wins += 1;
            } else {
                player.losses += 1;
            }
            player.last_played = Some(match player.last_played {
                Some(previous) => previous.max(record.played_at),
                None => record.played_at,
            });
            debug!(
                "{}: {:.1} -> {:.1} (expected {:.3})",
                change.player_id,
                change.old_rating.rating,
                change.new_rating.rating,
                change.expected
            );
        }

        Ok(result.rating_changes)
    }

    /// Presentation value of a stored rating; monotonic in `player.rating`
    pub fn display_rating(&self, player: &Player) -> i64 {
        (player.rating.rating * self.config.display_scale + self.config.display_offset).round()
            as i64
    }

    /// Get a player record
    pub async fn player(&self, player_id: &str) -> Result<Option<Player>> {
        self.players.get(player_id).await
    }

    /// Summary statistics for one player
    pub async fn player_stats(&self, player_id: &str) -> Result<PlayerStats> {
        let player =
            self.players
                .get(player_id)
                .await?
                .ok_or_else(|| BalancerError::PlayerNotFound {
                    player_id: player_id.to_string(),
                })?;
        Ok(self.stats_for(&player))
    }

    /// All players ordered by rating, highest first; ties by id
    pub async fn leaderboard(&self) -> Result<Vec<PlayerStats>> {
        let mut players = self.players.get_all().await?;
        players.sort_by(|a, b| {
            b.rating
                .rating
                .partial_cmp(&a.rating.rating)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(players.iter().map(|p| self.stats_for(p)).collect())
    }

    fn stats_for(&self, player: &Player) -> PlayerStats {
        PlayerStats {
            player_id: player.id.clone(),
            name: player.name.clone(),
            games_played: player.games_played,
            wins: player.wins,
            losses: player.losses,
            win_rate: player.win_rate(),
            rating: player.rating.rating,
            display_rating: self.display_rating(player),
            last_played: player.last_played,
        }
    }
}
