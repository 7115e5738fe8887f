//! League service
//!
//! Composes the rating engine, relationship analyzer, balancers and preset
//! store behind one entry point. Every public operation logs and records
//! metrics; errors are returned unchanged to the caller.

use crate::balance::{
    check_candidate_count, BalanceContext, Candidate, Objective, PartitionResult,
    SingleObjectiveBalancer, WeightVector, WeightedSelector, WinProbability,
    WinProbabilityEstimator,
};
use crate::config::AppConfig;
use crate::error::{BalancerError, Result};
use crate::metrics::MetricsCollector;
use crate::presets::{validate_preset_name, PresetRepository, WeightPreset};
use crate::rating::{RatingEngine, RecomputeSummary};
use crate::relationships::PairwiseRelationshipAnalyzer;
use crate::storage::{MatchRepository, PlayerRepository};
use crate::types::{
    DateRange, Match, MatchId, MatchParticipation, PlayerId, PlayerStats, RatingChange,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How a balance request picks its partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceRequest {
    /// Optimize one objective
    Single(Objective),
    /// Blend all six objectives
    Weighted(WeightVector),
}

impl BalanceRequest {
    pub fn label(&self) -> &'static str {
        match self {
            BalanceRequest::Single(objective) => objective.label(),
            BalanceRequest::Weighted(_) => "weighted",
        }
    }
}

/// Entry point for recording results, forming teams and managing presets
pub struct LeagueService {
    config: AppConfig,
    players: Arc<dyn PlayerRepository>,
    engine: RatingEngine,
    analyzer: PairwiseRelationshipAnalyzer,
    estimator: WinProbabilityEstimator,
    presets: Arc<dyn PresetRepository>,
    metrics: Arc<MetricsCollector>,
}

impl LeagueService {
    /// Build the service from validated configuration and its collaborators
    pub fn new(
        config: AppConfig,
        players: Arc<dyn PlayerRepository>,
        matches: Arc<dyn MatchRepository>,
        presets: Arc<dyn PresetRepository>,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self> {
        crate::config::validate_config(&config)?;
        let engine = RatingEngine::new(players.clone(), matches.clone(), config.rating.clone())?;
        let analyzer = PairwiseRelationshipAnalyzer::new(matches);
        let estimator = WinProbabilityEstimator::from_config(&config.balancer)?;

        info!(
            "{} ready: enumeration limited to {}..={} candidates",
            config.service.name, config.balancer.min_players, config.balancer.max_players
        );

        Ok(Self {
            config,
            players,
            engine,
            analyzer,
            estimator,
            presets,
            metrics,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> &RatingEngine {
        &self.engine
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    async fn refresh_player_gauge(&self) -> Result<()> {
        let count = self.players.get_all().await?.len();
        self.metrics.set_rated_players(count);
        Ok(())
    }

    /// Store and rate a finished match
    pub async fn record_result(
        &self,
        record: Match,
        participations: Vec<MatchParticipation>,
    ) -> Result<Vec<RatingChange>> {
        let match_id = record.id;
        let changes = self.engine.record_result(record, participations).await?;
        self.metrics.record_match();
        self.refresh_player_gauge().await?;
        debug!("Match {} produced {} rating changes", match_id, changes.len());
        Ok(changes)
    }

    /// Rebuild every rating from the stored history
    pub async fn recompute(&self) -> Result<RecomputeSummary> {
        let outcome = self.engine.recompute_all().await;
        self.metrics.record_recompute(outcome.is_ok());
        let summary = outcome?;
        self.refresh_player_gauge().await?;
        Ok(summary)
    }

    /// Delete a match and recompute ratings without it
    pub async fn delete_match(&self, match_id: MatchId) -> Result<RecomputeSummary> {
        let outcome = self.engine.delete_match(match_id).await;
        // Unknown ids fail before any recompute runs
        let recomputed = !matches!(
            outcome.as_ref().map_err(BalancerError::find),
            Err(Some(BalancerError::MatchNotFound { .. }))
        );
        if recomputed {
            self.metrics.record_recompute(outcome.is_ok());
        }
        let summary = outcome?;
        self.refresh_player_gauge().await?;
        Ok(summary)
    }

    /// Remove every player and match
    pub async fn wipe(&self) -> Result<()> {
        self.engine.wipe().await?;
        self.metrics.set_rated_players(0);
        Ok(())
    }

    pub async fn leaderboard(&self) -> Result<Vec<PlayerStats>> {
        self.engine.leaderboard().await
    }

    pub async fn player_stats(&self, player_id: &str) -> Result<PlayerStats> {
        self.engine.player_stats(player_id).await
    }

    async fn candidates(&self, candidate_ids: &[PlayerId]) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::with_capacity(candidate_ids.len());
        for player_id in candidate_ids {
            let player = self.players.get(player_id).await?.ok_or_else(|| {
                BalancerError::PlayerNotFound {
                    player_id: player_id.clone(),
                }
            })?;
            candidates.push(Candidate::from(&player));
        }
        Ok(candidates)
    }

    /// Split `candidate_ids` into two sides
    ///
    /// Familiarity and recency only count matches inside `window` when one
    /// is given. Recency is measured up to `now`.
    pub async fn balance<R: Rng + ?Sized>(
        &self,
        candidate_ids: &[PlayerId],
        request: BalanceRequest,
        window: Option<&DateRange>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<PartitionResult> {
        let label = request.label();
        if let Err(e) = check_candidate_count(candidate_ids.len(), &self.config.balancer) {
            warn!("Rejected {} balance request: {}", label, e);
            return Err(e);
        }
        if let BalanceRequest::Weighted(weights) = &request {
            weights.validate()?;
        }

        let timer = self.metrics.start_timer();
        let candidates = self.candidates(candidate_ids).await?;
        let (familiarity, recency) = self.analyzer.build_all(candidate_ids, window).await?;
        let context = BalanceContext::new(
            candidates,
            &familiarity,
            &recency,
            now,
            &self.config.balancer,
        )?;

        let result = match request {
            BalanceRequest::Single(objective) => {
                SingleObjectiveBalancer::new(&context).balance(objective, rng)?
            }
            BalanceRequest::Weighted(weights) => WeightedSelector::balance(
                &context,
                &weights,
                self.config.balancer.parallel_threshold,
                rng,
            )?,
        };

        let elapsed = timer.stop();
        self.metrics
            .record_balance(label, result.partitions_evaluated, elapsed);
        info!(
            "Balanced {} candidates by {}: {} partitions in {:?}",
            context.len(),
            label,
            result.partitions_evaluated,
            elapsed
        );
        Ok(result)
    }

    /// Win probability for a proposed split
    pub async fn win_probability(
        &self,
        side1: &[PlayerId],
        side2: &[PlayerId],
    ) -> Result<WinProbability> {
        if let Some(shared) = side1.iter().find(|id| side2.contains(id)) {
            return Err(BalancerError::DuplicateCandidate {
                player_id: shared.clone(),
            }
            .into());
        }
        let ratings = |candidates: Vec<Candidate>| -> Vec<_> {
            candidates.into_iter().map(|c| c.rating).collect()
        };
        let side1_ratings = ratings(self.candidates(side1).await?);
        let side2_ratings = ratings(self.candidates(side2).await?);
        let estimate = self
            .estimator
            .estimate_sides(&side1_ratings, &side2_ratings)?;
        debug!(
            "Win probability {}% vs {}%",
            estimate.side1_probability, estimate.side2_probability
        );
        Ok(estimate)
    }

    pub async fn presets(&self) -> Result<Vec<WeightPreset>> {
        self.presets.load_all().await
    }

    /// Save weights under a new, unique name
    pub async fn save_preset(&self, name: &str, weights: WeightVector) -> Result<WeightPreset> {
        weights.validate()?;
        let existing = self.presets.load_all().await?;
        let name = validate_preset_name(name, &existing, None)?;
        let preset = WeightPreset::new(name, weights);
        self.presets.save(preset.clone()).await?;
        info!("Saved weight preset '{}' ({})", preset.name, preset.id);
        Ok(preset)
    }

    pub async fn rename_preset(&self, preset_id: Uuid, name: &str) -> Result<()> {
        let existing = self.presets.load_all().await?;
        let name = validate_preset_name(name, &existing, Some(preset_id))?;
        self.presets.rename(preset_id, name).await
    }

    pub async fn delete_preset(&self, preset_id: Uuid) -> Result<()> {
        if !self.presets.delete(preset_id).await? {
            return Err(BalancerError::PresetNotFound {
                preset_id: preset_id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::repository::MockPresetRepository;
    use crate::presets::InMemoryPresetRepository;
    use crate::storage::{InMemoryMatchRepository, InMemoryPlayerRepository};
    use crate::types::Side;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn service() -> LeagueService {
        LeagueService::new(
            AppConfig::default(),
            Arc::new(InMemoryPlayerRepository::new()),
            Arc::new(InMemoryMatchRepository::new()),
            Arc::new(InMemoryPresetRepository::new()),
            Arc::new(MetricsCollector::new().unwrap()),
        )
        .unwrap()
    }

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap() + Duration::days(n)
    }

    fn result(
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

    fn ids(values: &[&str]) -> Vec<PlayerId> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_record_and_delete() {
        let service = service();
        let (record, rows) = result(day(0), Side::One, &["a", "b"], &["c", "d"]);
        let match_id = record.id;
        service.record_result(record, rows).await.unwrap();
        assert_eq!(service.metrics().rating().rated_players.get(), 4);

        service.delete_match(match_id).await.unwrap();
        let board = service.leaderboard().await.unwrap();
        assert!(board.iter().all(|p| p.games_played == 0));
        assert_eq!(service.metrics().rating().recomputes_total.get(), 1);

        assert!(service.delete_match(match_id).await.is_err());
        assert_eq!(service.metrics().rating().recomputes_total.get(), 1);
    }

    #[tokio::test]
    async fn test_balance_uses_history() {
        let service = service();
        for n in 0..3 {
            let (record, rows) = result(day(n), Side::One, &["a", "b"], &["c", "d"]);
            service.record_result(record, rows).await.unwrap();
        }
        let mut rng = StdRng::seed_from_u64(5);

        let novelty = service
            .balance(
                &ids(&["a", "b", "c", "d"]),
                BalanceRequest::Single(Objective::Novelty),
                None,
                day(10),
                &mut rng,
            )
            .await
            .unwrap();
        assert_eq!(novelty.side1_ids, vec!["a", "c"]);
        assert_eq!(novelty.raw_scores[&Objective::Novelty], 0.0);

        let weighted = service
            .balance(
                &ids(&["a", "b", "c", "d"]),
                BalanceRequest::Weighted(WeightVector::only(Objective::Novelty)),
                None,
                day(10),
                &mut rng,
            )
            .await
            .unwrap();
        assert_eq!(weighted.objective_label, "weighted");
        assert_eq!(weighted.normalized_scores[&Objective::Novelty], 1.0);
        assert_ne!(weighted.side1_ids, vec!["a", "b"]);
        assert_eq!(
            service
                .metrics()
                .balance()
                .requests_total
                .with_label_values(&["novelty"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_balance_rejections() {
        let service = service();
        let mut rng = StdRng::seed_from_u64(5);

        let error = service
            .balance(
                &ids(&["a", "b", "c"]),
                BalanceRequest::Single(Objective::Skill),
                None,
                day(0),
                &mut rng,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            BalancerError::find(&error),
            Some(BalancerError::InsufficientPlayers { .. })
        ));

        let error = service
            .balance(
                &ids(&["a", "b", "c", "d"]),
                BalanceRequest::Single(Objective::Skill),
                None,
                day(0),
                &mut rng,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            BalancerError::find(&error),
            Some(BalancerError::PlayerNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_win_probability() {
        let service = service();
        let (record, rows) = result(day(0), Side::One, &["a", "b"], &["c", "d"]);
        service.record_result(record, rows).await.unwrap();

        let estimate = service
            .win_probability(&ids(&["a", "b"]), &ids(&["c", "d"]))
            .await
            .unwrap();
        assert!(estimate.side1_probability > 50);
        assert_eq!(estimate.side1_probability + estimate.side2_probability, 100);

        assert!(service
            .win_probability(&ids(&["a", "b"]), &ids(&["b", "c"]))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_presets() {
        let service = service();
        let preset = service
            .save_preset("Skill first", WeightVector::only(Objective::Skill))
            .await
            .unwrap();
        assert!(service
            .save_preset("skill FIRST", WeightVector::equal())
            .await
            .is_err());

        service.rename_preset(preset.id, "Ranked").await.unwrap();
        assert_eq!(service.presets().await.unwrap()[0].name, "Ranked");

        service.delete_preset(preset.id).await.unwrap();
        assert!(service.delete_preset(preset.id).await.is_err());
    }

    fn service_with_presets(presets: MockPresetRepository) -> LeagueService {
        LeagueService::new(
            AppConfig::default(),
            Arc::new(InMemoryPlayerRepository::new()),
            Arc::new(InMemoryMatchRepository::new()),
            Arc::new(presets),
            Arc::new(MetricsCollector::new().unwrap()),
        )
        .unwrap()
    }

    fn store_failure() -> anyhow::Error {
        BalancerError::RepositoryFailure {
            message: "preset store offline".to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_preset_store_failures_surface() {
        let mut presets = MockPresetRepository::new();
        presets
            .expect_load_all()
            .times(1)
            .returning(|| Err(store_failure()));
        presets.expect_save().never();
        let service = service_with_presets(presets);
        let error = service
            .save_preset("Skill first", WeightVector::equal())
            .await
            .unwrap_err();
        assert!(matches!(
            BalancerError::find(&error),
            Some(BalancerError::RepositoryFailure { .. })
        ));

        let mut presets = MockPresetRepository::new();
        presets.expect_load_all().returning(|| Ok(Vec::new()));
        presets
            .expect_save()
            .withf(|preset| preset.name == "Skill first")
            .times(1)
            .returning(|_| Err(store_failure()));
        presets.expect_delete().times(1).returning(|_| Ok(false));
        let service = service_with_presets(presets);
        let error = service
            .save_preset("  Skill first ", WeightVector::equal())
            .await
            .unwrap_err();
        assert!(matches!(
            BalancerError::find(&error),
            Some(BalancerError::RepositoryFailure { .. })
        ));
        let error = service.delete_preset(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            BalancerError::find(&error),
            Some(BalancerError::PresetNotFound { .. })
        ));
    }
}
