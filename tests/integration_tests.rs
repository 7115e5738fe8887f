//! Integration tests for the team balancer
//!
//! These tests drive the whole system through `LeagueService`:
//! - Recording results and replaying history
//! - Balancing by single objectives and weighted blends
//! - Win probability for proposed splits
//! - Dataset import and repository failures

mod fixtures;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use team_balancer::balance::{Objective, WeightVector};
use team_balancer::config::AppConfig;
use team_balancer::error::BalancerError;
use team_balancer::metrics::MetricsCollector;
use team_balancer::presets::InMemoryPresetRepository;
use team_balancer::storage::{Dataset, InMemoryPlayerRepository, MatchRepository};
use team_balancer::types::{DateRange, Player, PlayerRating, Side};
use team_balancer::{BalanceRequest, LeagueService};

use fixtures::{all_players, create_league, day, game, ids, play_rivalry, FlakyMatchRepository};

#[tokio::test]
async fn test_results_update_leaderboard() {
    let league = create_league();
    play_rivalry(&league, 6).await;

    let board = league.service.leaderboard().await.unwrap();
    assert_eq!(board.len(), 4);
    // A and B won four of six
    assert!(board[0].player_id == "A" || board[0].player_id == "B");
    for stats in &board {
        assert_eq!(stats.games_played, 6);
        assert_eq!(stats.wins + stats.losses, 6);
    }
    let a = league.service.player_stats("A").await.unwrap();
    assert_eq!(a.wins, 4);
    assert!((a.win_rate - 4.0 / 6.0).abs() < 1e-12);
    assert_eq!(a.last_played, Some(day(5)));
}

#[tokio::test]
async fn test_recompute_is_idempotent_and_matches_incremental() {
    let league = create_league();
    play_rivalry(&league, 5).await;
    let (record, rows) = game(day(6), Side::Two, &["A", "C", "E"], &["B", "D"]);
    league.service.record_result(record, rows).await.unwrap();
    let incremental = all_players(league.players.as_ref()).await;

    let summary = league.service.recompute().await.unwrap();
    assert_eq!(summary.players_reset, 5);
    assert_eq!(summary.matches_replayed, 6);
    let first = all_players(league.players.as_ref()).await;
    league.service.recompute().await.unwrap();
    let second = all_players(league.players.as_ref()).await;

    assert_eq!(first, second);
    assert_eq!(first, incremental);
}

#[tokio::test]
async fn test_recompute_on_empty_history_resets_everyone() {
    let league = create_league();
    let veteran = Player {
        games_played: 40,
        wins: 30,
        losses: 10,
        ..Player::new(
            "vet",
            PlayerRating {
                rating: 1900.0,
                uncertainty: 60.0,
            },
        )
    };
    use team_balancer::storage::PlayerRepository;
    league.players.put(veteran).await.unwrap();

    league.service.recompute().await.unwrap();
    let vet = league.players.get("vet").await.unwrap().unwrap();
    assert_eq!((vet.games_played, vet.wins, vet.losses), (0, 0, 0));
    assert_eq!(vet.rating, PlayerRating::default());
}

#[tokio::test]
async fn test_delete_match_rolls_back_ratings() {
    let league = create_league();
    play_rivalry(&league, 2).await;
    let before = all_players(league.players.as_ref()).await;

    let (record, rows) = game(day(9), Side::Two, &["A", "B"], &["C", "D"]);
    let match_id = record.id;
    league.service.record_result(record, rows).await.unwrap();
    assert_ne!(all_players(league.players.as_ref()).await, before);

    league.service.delete_match(match_id).await.unwrap();
    assert_eq!(all_players(league.players.as_ref()).await, before);
    assert_eq!(league.matches.len(), 2);
}

#[tokio::test]
async fn test_skill_balance_example() {
    let players = Arc::new(InMemoryPlayerRepository::with_players(
        [("A", 1500.0), ("B", 1400.0), ("C", 1300.0), ("D", 1200.0)]
            .into_iter()
            .map(|(id, rating)| {
                Player::new(
                    id,
                    PlayerRating {
                        rating,
                        uncertainty: 200.0,
                    },
                )
            }),
    ));
    let service = LeagueService::new(
        AppConfig::default(),
        players,
        Arc::new(team_balancer::storage::InMemoryMatchRepository::new()),
        Arc::new(InMemoryPresetRepository::new()),
        Arc::new(MetricsCollector::new().unwrap()),
    )
    .unwrap();

    let result = service
        .balance(
            &ids(&["D", "B", "A", "C"]),
            BalanceRequest::Single(Objective::Skill),
            None,
            day(0),
            &mut StdRng::seed_from_u64(11),
        )
        .await
        .unwrap();
    assert_eq!(result.side1_ids, vec!["A", "D"]);
    assert_eq!(result.side2_ids, vec!["B", "C"]);
    assert_eq!(result.raw_scores[&Objective::Skill], 0.0);
}

#[tokio::test]
async fn test_novelty_and_reunion_follow_history() {
    let league = create_league();
    play_rivalry(&league, 2).await;
    let mut rng = StdRng::seed_from_u64(3);
    let candidates = ids(&["A", "B", "C", "D"]);

    let novelty = league
        .service
        .balance(
            &candidates,
            BalanceRequest::Single(Objective::Novelty),
            None,
            day(30),
            &mut rng,
        )
        .await
        .unwrap();
    assert_eq!(novelty.side1_ids, vec!["A", "C"]);

    let reunion = league
        .service
        .balance(
            &candidates,
            BalanceRequest::Single(Objective::Reunion),
            None,
            day(30),
            &mut rng,
        )
        .await
        .unwrap();
    // Never-paired pairs score 365 days each and beat the 29-day-old pairs
    assert_eq!(reunion.side1_ids, vec!["A", "C"]);
    assert_eq!(reunion.raw_scores[&Objective::Reunion], 730.0);

    // A window that excludes every match makes all splits equally novel
    let window = DateRange::new(Some(day(20)), None);
    let windowed = league
        .service
        .balance(
            &candidates,
            BalanceRequest::Single(Objective::Novelty),
            Some(&window),
            day(30),
            &mut rng,
        )
        .await
        .unwrap();
    assert_eq!(windowed.side1_ids, vec!["A", "B"]);
}

#[tokio::test]
async fn test_weighted_skill_only_agrees_with_single_objective() {
    let league = create_league();
    play_rivalry(&league, 4).await;
    let (record, rows) = game(day(5), Side::One, &["E", "F", "A"], &["B", "C", "D"]);
    league.service.record_result(record, rows).await.unwrap();
    let candidates = ids(&["A", "B", "C", "D", "E", "F"]);
    let mut rng = StdRng::seed_from_u64(8);

    let single = league
        .service
        .balance(
            &candidates,
            BalanceRequest::Single(Objective::Skill),
            None,
            day(10),
            &mut rng,
        )
        .await
        .unwrap();
    let weighted = league
        .service
        .balance(
            &candidates,
            BalanceRequest::Weighted(WeightVector::only(Objective::Skill)),
            None,
            day(10),
            &mut rng,
        )
        .await
        .unwrap();

    assert_eq!(single.side1_ids, weighted.side1_ids);
    assert_eq!(single.side2_ids, weighted.side2_ids);
    assert_eq!(weighted.partitions_evaluated, 20);
    for value in weighted.normalized_scores.values() {
        assert!((0.0..=1.0).contains(value));
    }
}

#[tokio::test]
async fn test_candidate_limits() {
    let league = create_league();
    let mut rng = StdRng::seed_from_u64(1);

    let too_many: Vec<String> = (0..21).map(|i| format!("p{}", i)).collect();
    let error = league
        .service
        .balance(
            &too_many,
            BalanceRequest::Single(Objective::Skill),
            None,
            day(0),
            &mut rng,
        )
        .await
        .unwrap_err();
    assert_eq!(
        BalancerError::find(&error),
        Some(&BalancerError::TooManyCandidates {
            count: 21,
            maximum: 20
        })
    );

    play_rivalry(&league, 1).await;
    let error = league
        .service
        .balance(
            &ids(&["A", "B", "C", "A"]),
            BalanceRequest::Single(Objective::Skill),
            None,
            day(0),
            &mut rng,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        BalancerError::find(&error),
        Some(BalancerError::DuplicateCandidate { .. })
    ));
}

#[tokio::test]
async fn test_win_probability_for_split() {
    let league = create_league();
    play_rivalry(&league, 6).await;

    let estimate = league
        .service
        .win_probability(&ids(&["A", "B"]), &ids(&["C", "D"]))
        .await
        .unwrap();
    assert!(estimate.side1_probability > estimate.side2_probability);
    assert_eq!(estimate.side1_probability + estimate.side2_probability, 100);
    assert!(estimate.side1_lower <= estimate.side1_probability);
    assert!(estimate.side1_probability <= estimate.side1_upper);
    assert!(estimate.side2_lower <= estimate.side2_probability);
    assert!(estimate.side2_probability <= estimate.side2_upper);
}

#[tokio::test]
async fn test_dataset_import_then_recompute() {
    let league = create_league();
    play_rivalry(&league, 3).await;
    let snapshot = Dataset::capture(league.players.as_ref(), league.matches.as_ref())
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("league.json");
    snapshot.save(&path).unwrap();

    let restored = create_league();
    Dataset::from_file(&path)
        .unwrap()
        .load_into(restored.players.as_ref(), restored.matches.as_ref())
        .await
        .unwrap();
    restored.service.recompute().await.unwrap();

    assert_eq!(
        all_players(restored.players.as_ref()).await,
        all_players(league.players.as_ref()).await
    );
}

#[tokio::test]
async fn test_repository_failure_surfaces() {
    let players = Arc::new(InMemoryPlayerRepository::new());
    let matches = Arc::new(FlakyMatchRepository::new(0));
    let service = LeagueService::new(
        AppConfig::default(),
        players.clone(),
        matches.clone(),
        Arc::new(InMemoryPresetRepository::new()),
        Arc::new(MetricsCollector::new().unwrap()),
    )
    .unwrap();

    let (record, rows) = game(day(0), Side::One, &["A", "B"], &["C", "D"]);
    service.record_result(record, rows).await.unwrap();
    assert!(matches.get_all().await.is_err());

    let error = service.recompute().await.unwrap_err();
    assert!(matches!(
        BalancerError::find(&error),
        Some(BalancerError::RepositoryFailure { .. })
    ));
    assert_eq!(service.metrics().rating().recompute_failures_total.get(), 1);
    // Ratings from the incremental update are untouched
    let a = service.player_stats("A").await.unwrap();
    assert_eq!(a.games_played, 1);
}

#[tokio::test]
async fn test_wipe_clears_everything() {
    let league = create_league();
    play_rivalry(&league, 2).await;

    league.service.wipe().await.unwrap();
    assert!(league.service.leaderboard().await.unwrap().is_empty());
    assert!(league.matches.is_empty());
}
