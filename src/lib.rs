//! Tower Jumper - an endless vertical platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, platforms, scoring, difficulty)
//! - `render`: Canvas-2D rendering
//! - `storage`: Exception-safe LocalStorage key/value layer
//! - `pixel`: Avatar customization (solid color / 20x20 pixel art, 5 slots)
//! - `settings`: Theme state, settings panel, audio preferences
//! - `highscores`: Persisted top-10 ledger

pub mod highscores;
pub mod pixel;
pub mod render;
pub mod settings;
pub mod sim;
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod ui;

pub use highscores::HighScores;
pub use settings::{SettingsPanel, Theme};
pub use storage::Store;

/// Game configuration constants
pub mod consts {
    /// Default canvas dimensions (the shell passes the real size)
    pub const CANVAS_WIDTH: f32 = 400.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.7;
    /// Jump impulse (negative = up)
    pub const JUMP_VELOCITY: f32 = -13.4;
    /// Horizontal run speed
    pub const PLAYER_SPEED: f32 = 3.2;
    /// Player is a square sprite
    pub const PLAYER_SIZE: f32 = 30.0;
    /// Airborne spin rate (radians per tick)
    pub const SPIN_SPEED: f32 = 0.12;

    pub const PLATFORM_HEIGHT: f32 = 14.0;
    /// The initial ground platform is thinner than regular platforms
    pub const BASE_PLATFORM_HEIGHT: f32 = 10.0;
    /// Vertical spacing between generated platforms
    pub const PLATFORM_GAP: f32 = 80.0;
    /// Spawn a platform once the topmost one has scrolled below this y
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Platforms this far below the bottom edge are culled
    pub const CULL_MARGIN: f32 = 50.0;
    /// World scroll kicks in once score exceeds this
    pub const SCROLL_UNLOCK_SCORE: u32 = 3;
    /// Chance a newly spawned platform moves (once the speed ramp is active)
    pub const MOVING_PLATFORM_CHANCE: f64 = 0.3;
}
