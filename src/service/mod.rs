//! Service layer for the team balancer
//!
//! `LeagueService` wires the rating engine, relationship analyzer, balancers,
//! preset store and metrics together for the CLI and embedding callers.

pub mod app;

pub use app::{BalanceRequest, LeagueService};
