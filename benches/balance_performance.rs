//! Performance benchmarks for rating updates and partition search

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use team_balancer::balance::{
    BalanceContext, Candidate, Objective, SingleObjectiveBalancer, WeightVector, WeightedSelector,
};
use team_balancer::config::{BalancerConfig, RatingConfig};
use team_balancer::rating::{RatingCalculator, RatingEngine, TeamEloCalculator};
use team_balancer::storage::{InMemoryMatchRepository, InMemoryPlayerRepository};
use team_balancer::types::{Match, MatchParticipation, PlayerRating, Side};

fn bench_candidates(count: usize) -> Vec<Candidate> {
    (0..count)
        .map(|i| Candidate {
            id: format!("player_{:02}", i),
            rating: PlayerRating {
                rating: 1200.0 + (i as f64 * 37.0) % 600.0,
                uncertainty: 200.0,
            },
            games_played: 10 + i as u32,
            wins: 5 + (i as u32 % 7),
        })
        .collect()
}

fn bench_rating_calculations(c: &mut Criterion) {
    let calculator = TeamEloCalculator::new(RatingConfig::default()).unwrap();
    let side = |offset: usize| -> Vec<(String, PlayerRating)> {
        (0..3)
            .map(|i| {
                (
                    format!("player{}", offset + i),
                    PlayerRating {
                        rating: 1450.0 + ((offset + i) as f64 * 25.0),
                        uncertainty: 200.0,
                    },
                )
            })
            .collect()
    };
    let (side_one, side_two) = (side(0), side(3));

    c.bench_function("team_elo_3v3", |b| {
        b.iter(|| {
            black_box(calculator.calculate_rating_changes(&side_one, &side_two, Side::One))
        })
    });
}

fn bench_single_objective(c: &mut Criterion) {
    let config = BalancerConfig::default();
    let mut group = c.benchmark_group("single_objective_skill");
    for count in [8usize, 12, 16] {
        let context = BalanceContext::without_history(bench_candidates(count), &config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(count), &context, |b, context| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| {
                black_box(
                    SingleObjectiveBalancer::new(context)
                        .balance(Objective::Skill, &mut rng)
                        .unwrap(),
                )
            })
        });
    }
    group.finish();
}

fn bench_weighted(c: &mut Criterion) {
    let config = BalancerConfig::default();
    let mut group = c.benchmark_group("weighted_equal");
    group.sample_size(20);
    for (count, threshold) in [(12usize, usize::MAX), (16, usize::MAX), (16, 0)] {
        let context = BalanceContext::without_history(bench_candidates(count), &config).unwrap();
        let label = if threshold == 0 { "parallel" } else { "sequential" };
        group.bench_with_input(
            BenchmarkId::new(label, count),
            &context,
            |b, context| {
                let mut rng = StdRng::seed_from_u64(7);
                b.iter(|| {
                    black_box(
                        WeightedSelector::balance(
                            context,
                            &WeightVector::equal(),
                            threshold,
                            &mut rng,
                        )
                        .unwrap(),
                    )
                })
            },
        );
    }
    group.finish();
}

fn bench_recompute(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let engine = rt.block_on(async {
        let players = Arc::new(InMemoryPlayerRepository::new());
        let matches = Arc::new(InMemoryMatchRepository::new());
        let engine = RatingEngine::new(players, matches, RatingConfig::default()).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        for n in 0..200i64 {
            let winner = if n % 2 == 0 { Side::One } else { Side::Two };
            let record = Match::new(start + Duration::hours(n), winner);
            let rows = (0..8usize)
                .map(|i| {
                    let seat = i + n as usize;
                    let side = if seat % 2 == 0 { Side::One } else { Side::Two };
                    MatchParticipation::new(record.id, format!("player_{}", seat % 12), side)
                })
                .collect();
            engine.record_result(record, rows).await.unwrap();
        }
        engine
    });

    c.bench_function("recompute_200_matches", |b| {
        b.iter(|| rt.block_on(async { black_box(engine.recompute_all().await.unwrap()) }))
    });
}

criterion_group!(
    benches,
    bench_rating_calculations,
    bench_single_objective,
    bench_weighted,
    bench_recompute
);
criterion_main!(benches);
