//! matchup-core library.
//!
//! The [`engine::MatchSession`] owns one matching round: two shuffled
//! columns, the pending picks, the confirmed pairs, and the round's
//! correct/wrong counters. Everything around it (rendering, audio, storage,
//! navigation) talks to the engine through the ports in [`ports`].
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at the library seams, `anyhow::Result`
//!   for storage and configuration I/O.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod deck;
pub mod drill;
pub mod engine;
pub mod error;
pub mod ports;
pub mod profile;
pub mod random;
pub mod store;

pub use deck::{Card, Deck, DeckError, Screen, ScreenKind};
pub use drill::{Drill, DrillKind, LearningBoard};
pub use engine::{
    CellState, Column, MatchSession, NoOpReason, Phase, RoundStats, SelectEvent, Selection,
    SessionEvent, SetupError,
};
pub use random::{RandomSource, ScriptedSource, shuffle};
