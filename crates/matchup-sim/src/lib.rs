//! matchup-sim library.
//!
//! Seeded players click through real [`matchup_core::MatchSession`] rounds
//! while an oracle checks the session invariants after every click.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod campaign;
pub mod oracle;
pub mod player;
pub mod rng;

pub use campaign::{
    CampaignConfig, CampaignReport, DetailedTrace, SeedFailure, replay_seed, run_campaign,
};
pub use oracle::{InvariantViolation, OracleResult, SessionOracle};
pub use player::{Click, SimulatedPlayer, Strategy};
pub use rng::DeterministicRng;
