//! Common types used throughout the team balancer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillratings::elo::EloRating;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// One of the two fixed sides of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// The opposing side
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::One => write!(f, "Side 1"),
            Side::Two => write!(f, "Side 2"),
        }
    }
}

/// Skill estimate for a player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerRating {
    pub rating: f64,
    pub uncertainty: f64,
}

impl Default for PlayerRating {
    fn default() -> Self {
        Self {
            rating: 1500.0,
            uncertainty: 200.0,
        }
    }
}

impl From<PlayerRating> for EloRating {
    fn from(rating: PlayerRating) -> Self {
        Self {
            rating: rating.rating,
        }
    }
}

/// Player record with cumulative results
///
/// `wins + losses == games_played` holds after every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: PlayerRating,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

impl Player {
    /// Create a player that has not played yet
    pub fn new(id: impl Into<PlayerId>, rating: PlayerRating) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            rating,
            games_played: 0,
            wins: 0,
            losses: 0,
            last_played: None,
        }
    }

    /// Fraction of games won, 0 for a player without games
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games_played as f64
    }

    /// Clear results and restore the given starting rating
    pub fn reset(&mut self, rating: PlayerRating) {
        self.rating = rating;
        self.games_played = 0;
        self.wins = 0;
        self.losses = 0;
        self.last_played = None;
    }
}

/// A recorded match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub played_at: DateTime<Utc>,
    pub winner: Side,
    /// Match length in minutes, if tracked
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Free-form category such as a map or game mode
    #[serde(default)]
    pub category: Option<String>,
}

impl Match {
    pub fn new(played_at: DateTime<Utc>, winner: Side) -> Self {
        Self {
            id: Uuid::new_v4(),
            played_at,
            winner,
            duration_minutes: None,
            category: None,
        }
    }
}

/// A player's appearance in a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchParticipation {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub side: Side,
    /// Per-player performance counters, carried through but not interpreted
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
}

impl MatchParticipation {
    pub fn new(match_id: MatchId, player_id: impl Into<PlayerId>, side: Side) -> Self {
        Self {
            match_id,
            player_id: player_id.into(),
            side,
            counters: BTreeMap::new(),
        }
    }
}

/// Rating change information for a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub player_id: PlayerId,
    pub side: Side,
    pub old_rating: PlayerRating,
    pub new_rating: PlayerRating,
    /// Expected outcome against the opposing side, in 0.0..=1.0
    pub expected: f64,
    pub won: bool,
}

impl RatingChange {
    pub fn delta(&self) -> f64 {
        self.new_rating.rating - self.old_rating.rating
    }
}

/// Summary row for leaderboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub name: String,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub rating: f64,
    pub display_rating: i64,
    pub last_played: Option<DateTime<Utc>>,
}

/// Inclusive date window used to restrict match history
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }
}
