//! Test fixtures and stub repositories for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use team_balancer::config::AppConfig;
use team_balancer::error::{BalancerError, Result};
use team_balancer::metrics::MetricsCollector;
use team_balancer::presets::InMemoryPresetRepository;
use team_balancer::storage::{
    InMemoryMatchRepository, InMemoryPlayerRepository, MatchRepository, PlayerRepository,
};
use team_balancer::types::{Match, MatchId, MatchParticipation, PlayerId, Side};
use team_balancer::LeagueService;

/// A service over fresh in-memory repositories, with handles to them
pub struct TestLeague {
    pub service: LeagueService,
    pub players: Arc<InMemoryPlayerRepository>,
    pub matches: Arc<InMemoryMatchRepository>,
}

pub fn create_league() -> TestLeague {
    create_league_with(AppConfig::default())
}

pub fn create_league_with(config: AppConfig) -> TestLeague {
    let players = Arc::new(InMemoryPlayerRepository::new());
    let matches = Arc::new(InMemoryMatchRepository::new());
    let service = LeagueService::new(
        config,
        players.clone(),
        matches.clone(),
        Arc::new(InMemoryPresetRepository::new()),
        Arc::new(MetricsCollector::new().expect("metrics registry")),
    )
    .expect("valid default configuration");
    TestLeague {
        service,
        players,
        matches,
    }
}

/// Evening of day `n` of the test season
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 19, 30, 0).unwrap() + Duration::days(n)
}

/// Build a match with one participation row per player
pub fn game(
    at: DateTime<Utc>,
    winner: Side,
    side_one: &[&str],
    side_two: &[&str],
) -> (Match, Vec<MatchParticipation>) {
    let record = Match::new(at, winner);
    let rows = side_one
        .iter()
        .map(|id| MatchParticipation::new(record.id, *id, Side::One))
        .chain(
            side_two
                .iter()
                .map(|id| MatchParticipation::new(record.id, *id, Side::Two)),
        )
        .collect();
    (record, rows)
}

pub fn ids(values: &[&str]) -> Vec<PlayerId> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A short season: A and B always team up, C and D always team up
pub async fn play_rivalry(league: &TestLeague, games: i64) {
    for n in 0..games {
        let winner = if n % 3 == 0 { Side::Two } else { Side::One };
        let (record, rows) = game(day(n), winner, &["A", "B"], &["C", "D"]);
        league.service.record_result(record, rows).await.unwrap();
    }
}

/// Match repository whose reads fail after a number of successful calls
pub struct FlakyMatchRepository {
    inner: InMemoryMatchRepository,
    reads_left: AtomicUsize,
}

impl FlakyMatchRepository {
    pub fn new(successful_reads: usize) -> Self {
        Self {
            inner: InMemoryMatchRepository::new(),
            reads_left: AtomicUsize::new(successful_reads),
        }
    }

    fn read(&self) -> Result<()> {
        let left = self.reads_left.load(Ordering::SeqCst);
        if left == 0 {
            return Err(BalancerError::RepositoryFailure {
                message: "match store offline".to_string(),
            }
            .into());
        }
        self.reads_left.store(left - 1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl MatchRepository for FlakyMatchRepository {
    async fn get_all(&self) -> Result<Vec<Match>> {
        self.read()?;
        self.inner.get_all().await
    }

    async fn get(&self, match_id: MatchId) -> Result<Option<Match>> {
        self.inner.get(match_id).await
    }

    async fn get_participations(&self, match_id: MatchId) -> Result<Vec<MatchParticipation>> {
        self.inner.get_participations(match_id).await
    }

    async fn insert(&self, record: Match, participations: Vec<MatchParticipation>) -> Result<()> {
        self.inner.insert(record, participations).await
    }

    async fn delete(&self, match_id: MatchId) -> Result<bool> {
        self.inner.delete(match_id).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }
}

/// Snapshot of every stored player
pub async fn all_players(players: &dyn PlayerRepository) -> Vec<team_balancer::types::Player> {
    players.get_all().await.unwrap()
}
