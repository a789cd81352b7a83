//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame callback, no substeps
//! - Seeded RNG only
//! - Stable iteration order (platform insertion order)
//! - No rendering, audio, or platform dependencies

pub mod difficulty;
pub mod state;
pub mod tick;

pub use state::{GamePhase, GameState, Platform, Player, Skin};
pub use tick::{GameEvent, TickInput, tick};
