//! Command line entry point for the team balancer
//!
//! Loads a JSON dataset of players and matches into in-memory repositories,
//! then recomputes ratings, prints the leaderboard, balances teams or
//! manages saved weight presets.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use team_balancer::balance::{Objective, PartitionResult, WeightVector};
use team_balancer::config::AppConfig;
use team_balancer::metrics::MetricsCollector;
use team_balancer::presets::JsonFilePresetRepository;
use team_balancer::storage::{Dataset, InMemoryMatchRepository, InMemoryPlayerRepository};
use team_balancer::types::{DateRange, PlayerId};
use team_balancer::{BalanceRequest, LeagueService};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Team Balancer - ratings and balanced team formation for two-sided games
#[derive(Parser)]
#[command(
    name = "team-balancer",
    version,
    about = "Track results of two-sided games and split players into balanced teams",
    long_about = "Team Balancer replays a history of two-sided matches into per-player ratings \
                 and searches every split of a small group for the most balanced teams by skill, \
                 experience, win rate, novelty, reunion or a weighted blend of all of them."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dataset file
    #[arg(
        long,
        value_name = "FILE",
        default_value = "league.json",
        help = "JSON dataset with players and matches"
    )]
    data: PathBuf,

    /// Preset store file
    #[arg(
        long,
        value_name = "FILE",
        default_value = "presets.json",
        help = "JSON file holding saved weight presets"
    )]
    presets: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild every rating from the match history
    Recompute {
        /// Write the recomputed players back to the dataset
        #[arg(long)]
        write: bool,
    },
    /// Print players ordered by rating
    Leaderboard {
        #[arg(long)]
        json: bool,
    },
    /// Split players into two balanced sides
    Balance(BalanceArgs),
    /// Win probability for a proposed split
    WinProbability {
        #[arg(long, value_delimiter = ',', required = true)]
        side1: Vec<PlayerId>,
        #[arg(long, value_delimiter = ',', required = true)]
        side2: Vec<PlayerId>,
    },
    /// Manage saved weight presets
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(ClapArgs)]
struct BalanceArgs {
    /// Candidate player ids
    #[arg(long, value_delimiter = ',', required = true)]
    players: Vec<PlayerId>,

    /// Single objective: skill, experience, win-rate, novelty, reunion, random
    #[arg(long, conflicts_with_all = ["weights", "preset"])]
    objective: Option<Objective>,

    /// Weighted blend, e.g. "skill=3,novelty=1"
    #[arg(long, conflicts_with = "preset")]
    weights: Option<String>,

    /// Name of a saved weight preset
    #[arg(long)]
    preset: Option<String>,

    /// Only count shared history from this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    since: Option<String>,

    /// Only count shared history up to this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    until: Option<String>,

    /// Seed for the random objective
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum PresetAction {
    List,
    Save {
        #[arg(long)]
        name: String,
        /// Weights, e.g. "skill=3,novelty=1"
        #[arg(long)]
        weights: String,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    Rename {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        name: String,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    team_balancer::config::validate_config(&config)?;
    Ok(config)
}

/// Parse "skill=3,novelty=1" into a weight vector
fn parse_weights(raw: &str) -> Result<WeightVector> {
    let mut weights = WeightVector::default();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected objective=weight, got '{}'", entry))?;
        let objective: Objective = name.trim().parse().map_err(|e: String| anyhow!(e))?;
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid weight for {}", objective))?;
        weights.set(objective, value);
    }
    weights.validate()?;
    Ok(weights)
}

/// Parse a date bound; plain dates mean midnight UTC
fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'", raw))?;
    date.and_hms_opt(0, 0, 0)
        .map(|at| at.and_utc())
        .ok_or_else(|| anyhow!("Invalid date '{}'", raw))
}

struct Workspace {
    service: LeagueService,
    players: Arc<InMemoryPlayerRepository>,
    matches: Arc<InMemoryMatchRepository>,
}

async fn open_workspace(config: AppConfig, data: &Path, presets: &Path) -> Result<Workspace> {
    let players = Arc::new(InMemoryPlayerRepository::new());
    let matches = Arc::new(InMemoryMatchRepository::new());
    if data.exists() {
        Dataset::from_file(data)?
            .load_into(players.as_ref(), matches.as_ref())
            .await?;
    } else {
        info!("Dataset {} not found, starting empty", data.display());
    }

    let service = LeagueService::new(
        config,
        players.clone(),
        matches.clone(),
        Arc::new(JsonFilePresetRepository::new(presets)),
        Arc::new(MetricsCollector::new()?),
    )?;
    Ok(Workspace {
        service,
        players,
        matches,
    })
}

fn print_partition(result: &PartitionResult) {
    println!("Objective: {}", result.objective_label);
    println!("  Side 1: {}", result.side1_ids.join(", "));
    println!("  Side 2: {}", result.side2_ids.join(", "));
    for (objective, raw) in &result.raw_scores {
        match result.normalized_scores.get(objective) {
            Some(normalized) => {
                println!("  {:<10} {:>10.3}  ({:.3})", objective, raw, normalized)
            }
            None => println!("  {:<10} {:>10.3}", objective, raw),
        }
    }
    if let Some(score) = result.weighted_score {
        println!("  Weighted score: {:.4}", score);
    }
    println!("  Partitions evaluated: {}", result.partitions_evaluated);
}

async fn run_balance(workspace: &Workspace, args: BalanceArgs) -> Result<()> {
    let request = if let Some(objective) = args.objective {
        BalanceRequest::Single(objective)
    } else if let Some(raw) = &args.weights {
        BalanceRequest::Weighted(parse_weights(raw)?)
    } else if let Some(name) = &args.preset {
        let preset = workspace
            .service
            .presets()
            .await?
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("No preset named '{}'", name))?;
        BalanceRequest::Weighted(preset.weights)
    } else {
        BalanceRequest::Single(Objective::Skill)
    };

    let window = match (&args.since, &args.until) {
        (None, None) => None,
        (since, until) => Some(DateRange::new(
            since.as_deref().map(parse_date).transpose()?,
            until.as_deref().map(parse_date).transpose()?,
        )),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let result = workspace
        .service
        .balance(&args.players, request, window.as_ref(), Utc::now(), &mut rng)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_partition(&result);
    }
    Ok(())
}

async fn run_presets(store: &Path, service: &LeagueService, action: PresetAction) -> Result<()> {
    match action {
        PresetAction::List => {
            let presets = service.presets().await?;
            if presets.is_empty() {
                println!("No presets saved in {}", store.display());
            }
            for preset in presets {
                println!("{}  {}  {:?}", preset.id, preset.name, preset.weights);
            }
        }
        PresetAction::Save { name, weights } => {
            let preset = service.save_preset(&name, parse_weights(&weights)?).await?;
            println!("Saved preset {} ({})", preset.name, preset.id);
        }
        PresetAction::Delete { id } => {
            service.delete_preset(id).await?;
            println!("Deleted preset {}", id);
        }
        PresetAction::Rename { id, name } => {
            service.rename_preset(id, &name).await?;
            println!("Renamed preset {}", id);
        }
    }
    Ok(())
}

async fn run(args: Args, config: AppConfig) -> Result<()> {
    let workspace = open_workspace(config, &args.data, &args.presets).await?;

    match args.command {
        Command::Recompute { write } => {
            let summary = workspace.service.recompute().await?;
            println!(
                "Recomputed {} players from {} matches",
                summary.players_reset, summary.matches_replayed
            );
            if write {
                Dataset::capture(workspace.players.as_ref(), workspace.matches.as_ref())
                    .await?
                    .save(&args.data)?;
                info!("Wrote recomputed ratings to {}", args.data.display());
            }
        }
        Command::Leaderboard { json } => {
            let board = workspace.service.leaderboard().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                for (rank, stats) in board.iter().enumerate() {
                    println!(
                        "{:>3}. {:<20} {:>6}  {:>4} games  {:>5.1}% wins",
                        rank + 1,
                        stats.name,
                        stats.display_rating,
                        stats.games_played,
                        stats.win_rate * 100.0
                    );
                }
            }
        }
        Command::Balance(balance_args) => run_balance(&workspace, balance_args).await?,
        Command::WinProbability { side1, side2 } => {
            let estimate = workspace.service.win_probability(&side1, &side2).await?;
            println!(
                "Side 1: {}% ({}-{}%)",
                estimate.side1_probability, estimate.side1_lower, estimate.side1_upper
            );
            println!(
                "Side 2: {}% ({}-{}%)",
                estimate.side2_probability, estimate.side2_lower, estimate.side2_upper
            );
        }
        Command::Presets { action } => {
            run_presets(&args.presets, &workspace.service, action).await?
        }
    }

    debug!("Metrics:\n{}", workspace.service.metrics().export()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(
        "{} v{} (rating K={}, players {}..={})",
        config.service.name,
        team_balancer::VERSION,
        config.rating.k_factor,
        config.balancer.min_players,
        config.balancer.max_players
    );

    if let Err(e) = run(args, config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
