//! Game state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::difficulty::{PLATFORM_BASE_WIDTH, SCROLL_BASE_SPEED};
use crate::consts::*;
use crate::pixel::PixelArt;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Loop suspended; no ticks are scheduled
    Paused,
    /// Run ended (player fell off the bottom)
    GameOver,
}

/// How the player sprite is drawn. Exactly one representation is
/// authoritative at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Skin {
    /// Solid fill color (hex string)
    Color(String),
    /// 20x20 pixel-art grid blitted over the player box
    Pixel(PixelArt),
}

impl Default for Skin {
    fn default() -> Self {
        Skin::Color(crate::pixel::DEFAULT_COLOR.to_string())
    }
}

/// The player avatar
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
    /// Index of the supporting platform, re-derived every tick
    pub platform: Option<usize>,
    pub skin: Skin,
    /// Airborne spin angle (radians); 0 whenever grounded
    pub angle: f32,
    /// Spin direction, follows the last nonzero horizontal velocity
    pub spin_dir: f32,
}

impl Player {
    pub fn new(bounds: Vec2, skin: Skin) -> Self {
        Self {
            pos: Vec2::new(bounds.x / 2.0 - PLAYER_SIZE / 2.0, bounds.y - 40.0),
            vel: Vec2::ZERO,
            size: Vec2::splat(PLAYER_SIZE),
            on_ground: false,
            platform: None,
            skin,
            angle: 0.0,
            spin_dir: 1.0,
        }
    }
}

/// A platform the player can stand on
#[derive(Debug, Clone)]
pub struct Platform {
    pub pos: Vec2,
    pub size: Vec2,
    pub moving: bool,
    /// Horizontal direction, +1 or -1
    pub dir: f32,
    /// Creation index; drives the color band and the every-10th label
    pub index: u32,
    /// Latched the first time the player lands here
    pub scored: bool,
    /// The initial ground platform: never scores, never culled
    pub base: bool,
}

/// Complete game state, advanced by [`tick`](super::tick::tick)
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    /// Canvas dimensions the sim plays inside
    pub bounds: Vec2,
    pub score: u32,
    /// Total world scroll so far
    pub scroll_y: f32,
    /// Smoothed scroll speed (eases toward its score-derived target)
    pub scroll_speed: f32,
    /// Smoothed moving-platform speed
    pub platform_speed: f32,
    /// Smoothed width for newly spawned platforms
    pub base_platform_width: f32,
    pub player: Player,
    /// Insertion order is iteration order; collision and cull rely on it
    pub platforms: Vec<Platform>,
    next_platform_index: u32,
    pub rng: Pcg32,
}

impl GameState {
    /// Fresh run: the ground platform plus seven platforms at fixed
    /// 80-unit spacing, player centered just above the ground.
    pub fn new(bounds: Vec2, seed: u64, skin: Skin) -> Self {
        let mut state = Self {
            phase: GamePhase::Playing,
            bounds,
            score: 0,
            scroll_y: 0.0,
            scroll_speed: SCROLL_BASE_SPEED,
            platform_speed: 0.0,
            base_platform_width: PLATFORM_BASE_WIDTH,
            player: Player::new(bounds, skin),
            platforms: Vec::new(),
            next_platform_index: 0,
            rng: Pcg32::seed_from_u64(seed),
        };

        state.platforms.push(Platform {
            pos: Vec2::new(0.0, bounds.y - BASE_PLATFORM_HEIGHT),
            size: Vec2::new(bounds.x, BASE_PLATFORM_HEIGHT),
            moving: false,
            dir: 1.0,
            index: 0,
            scored: true,
            base: true,
        });

        for i in 1..8 {
            let width = state.base_platform_width;
            let x = state.rng.random_range(0.0..(bounds.x - width));
            let index = state.next_index();
            state.platforms.push(Platform {
                pos: Vec2::new(x, bounds.y - i as f32 * PLATFORM_GAP),
                size: Vec2::new(width, PLATFORM_HEIGHT),
                moving: false,
                dir: 1.0,
                index,
                scored: false,
                base: false,
            });
        }

        state
    }

    /// Allocate the next platform creation index
    pub fn next_index(&mut self) -> u32 {
        self.next_platform_index += 1;
        self.next_platform_index
    }
}
