//! Per-frame simulation step
//!
//! One call advances the world by exactly one frame. Input handlers never
//! touch the simulation directly; they fill a [`TickInput`] snapshot that is
//! consumed here.

use glam::Vec2;
use rand::Rng;

use super::difficulty::{
    PLATFORM_MIN_WIDTH, PLATFORM_RAMP_START, PLATFORM_SPEED_SMOOTHING, PLATFORM_WIDTH_SMOOTHING,
    SCROLL_SMOOTHING, ease_towards, target_platform_speed, target_platform_width,
    target_scroll_speed,
};
use super::state::{GamePhase, GameState, Platform};
use crate::consts::*;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Left held (arrow key / A / touch button)
    pub left: bool,
    /// Right held; wins over `left` when both are down
    pub right: bool,
    /// Jump key held
    pub jump_held: bool,
    /// One-shot pointer tap. The driver clears this after every tick,
    /// whether or not it produced a jump.
    pub jump_tap: bool,
}

/// Side effects the shell must perform; the sim itself stays pure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// First airborne-to-grounded transition this tick (land sfx)
    Landed,
    /// Player fell off the bottom; emitted exactly once per run
    GameOver { score: u32 },
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }

    // Input resolution. Right wins when both directions are held.
    state.player.vel.x = if input.right {
        PLAYER_SPEED
    } else if input.left {
        -PLAYER_SPEED
    } else {
        0.0
    };

    if (input.jump_held || input.jump_tap) && state.player.on_ground {
        state.player.vel.y = JUMP_VELOCITY;
        state.player.on_ground = false;
        state.player.platform = None;
    }

    let was_on_ground = state.player.on_ground;

    // Semi-implicit Euler, one step.
    state.player.vel.y += GRAVITY;
    let vel = state.player.vel;
    state.player.pos += vel;

    // Horizontal wrap: fully off one edge re-enters from the other.
    if state.player.pos.x < -state.player.size.x {
        state.player.pos.x = state.bounds.x;
    }
    if state.player.pos.x > state.bounds.x {
        state.player.pos.x = -state.player.size.x;
    }

    // Landing resolution. The tolerance band extends by the pre-step fall
    // speed so fast falls cannot tunnel through a platform in one frame.
    // Platforms are visited in insertion order; the last hit wins.
    state.player.on_ground = false;
    state.player.platform = None;
    {
        let GameState {
            player,
            platforms,
            score,
            ..
        } = state;
        for (i, platform) in platforms.iter_mut().enumerate() {
            let bottom = player.pos.y + player.size.y;
            let landing = player.vel.y >= 0.0
                && player.pos.x + player.size.x > platform.pos.x
                && player.pos.x < platform.pos.x + platform.size.x
                && bottom >= platform.pos.y
                && bottom <= platform.pos.y + platform.size.y + player.vel.y;
            if landing {
                player.pos.y = platform.pos.y - player.size.y;
                player.vel.y = 0.0;
                player.on_ground = true;
                player.platform = Some(i);
                // One point per platform, ever. The base never scores.
                if !platform.scored && !platform.base {
                    *score += 1;
                    platform.scored = true;
                }
            }
        }
    }

    if !was_on_ground && state.player.on_ground {
        events.push(GameEvent::Landed);
    }

    // A moving platform carries its rider.
    if let Some(i) = state.player.platform {
        let platform = &state.platforms[i];
        if platform.moving {
            state.player.pos.x += platform.dir * state.platform_speed;
        }
    }

    // World scroll: everything shifts down, the player visually climbs.
    if state.score > SCROLL_UNLOCK_SCORE {
        let speed = state.scroll_speed;
        state.scroll_y += speed;
        for platform in &mut state.platforms {
            platform.pos.y += speed;
        }
        state.player.pos.y += speed;
    }

    // Ease each difficulty value toward its score-derived target.
    state.scroll_speed = ease_towards(
        state.scroll_speed,
        target_scroll_speed(state.score),
        SCROLL_SMOOTHING,
    );
    state.platform_speed = ease_towards(
        state.platform_speed,
        target_platform_speed(state.score),
        PLATFORM_SPEED_SMOOTHING,
    );
    state.base_platform_width = ease_towards(
        state.base_platform_width,
        target_platform_width(state.score),
        PLATFORM_WIDTH_SMOOTHING,
    );

    // Spawn one platform whenever there is room above the screen.
    let highest_y = state
        .platforms
        .iter()
        .map(|p| p.pos.y)
        .fold(f32::INFINITY, f32::min);
    if highest_y > SPAWN_MARGIN {
        let moving =
            state.score >= PLATFORM_RAMP_START && state.rng.random_bool(MOVING_PLATFORM_CHANCE);
        let width = state.base_platform_width.max(PLATFORM_MIN_WIDTH);
        let x = state
            .rng
            .random_range(0.0..(state.bounds.x - width).max(10.0));
        let dir = if state.rng.random_bool(0.5) { -1.0 } else { 1.0 };
        let index = state.next_index();
        state.platforms.push(Platform {
            pos: Vec2::new(x, highest_y - PLATFORM_GAP),
            size: Vec2::new(width, PLATFORM_HEIGHT),
            moving,
            dir,
            index,
            scored: false,
            base: false,
        });
    }

    // Moving platforms oscillate, reflecting off the screen edges.
    let bounds_x = state.bounds.x;
    let platform_speed = state.platform_speed;
    for platform in &mut state.platforms {
        if platform.moving {
            platform.pos.x += platform.dir * platform_speed;
            if platform.pos.x < 0.0 || platform.pos.x + platform.size.x > bounds_x {
                platform.dir = -platform.dir;
            }
        }
    }

    // Cull platforms that scrolled off the bottom; the base stays.
    let cull_line = state.bounds.y + CULL_MARGIN;
    state.platforms.retain(|p| p.base || p.pos.y < cull_line);

    // Airborne spin follows the last nonzero horizontal velocity.
    let player = &mut state.player;
    if player.on_ground {
        player.angle = 0.0;
    } else {
        if player.vel.x > 0.0 {
            player.spin_dir = 1.0;
        } else if player.vel.x < 0.0 {
            player.spin_dir = -1.0;
        }
        if player.vel.x != 0.0 {
            player.angle += SPIN_SPEED * player.spin_dir;
        }
    }

    // Fell off the bottom: the run is over.
    if state.player.pos.y > state.bounds.y {
        state.phase = GamePhase::GameOver;
        events.push(GameEvent::GameOver { score: state.score });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Skin;

    fn test_state() -> GameState {
        GameState::new(
            Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            12345,
            Skin::default(),
        )
    }

    /// Park the player directly above a platform and let it fall on.
    fn drop_onto(state: &mut GameState, platform_idx: usize) {
        let platform = state.platforms[platform_idx].clone();
        state.player.pos = Vec2::new(
            platform.pos.x + platform.size.x / 2.0 - state.player.size.x / 2.0,
            platform.pos.y - state.player.size.y - 4.0,
        );
        state.player.vel = Vec2::ZERO;
        state.player.on_ground = false;
        let input = TickInput::default();
        for _ in 0..20 {
            tick(state, &input);
            if state.player.on_ground {
                return;
            }
        }
        panic!("player never landed");
    }

    #[test]
    fn test_landing_scores_exactly_once() {
        let mut state = test_state();
        assert_eq!(state.score, 0);

        drop_onto(&mut state, 3);
        assert_eq!(state.score, 1);
        assert!(state.platforms[3].scored);

        // Resting on the platform must not keep scoring
        let input = TickInput::default();
        for _ in 0..30 {
            tick(&mut state, &input);
        }
        assert_eq!(state.score, 1);
        assert!(state.platforms[3].scored);
    }

    #[test]
    fn test_base_platform_never_scores() {
        let mut state = test_state();
        drop_onto(&mut state, 0);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_landing_emits_land_event_once() {
        let mut state = test_state();
        let platform = state.platforms[3].clone();
        state.player.pos = Vec2::new(
            platform.pos.x,
            platform.pos.y - state.player.size.y - 4.0,
        );
        state.player.vel = Vec2::ZERO;
        state.player.on_ground = false;

        let input = TickInput::default();
        let mut landings = 0;
        for _ in 0..30 {
            let events = tick(&mut state, &input);
            landings += events
                .iter()
                .filter(|e| matches!(e, GameEvent::Landed))
                .count();
        }
        assert_eq!(landings, 1);
    }

    #[test]
    fn test_right_wins_when_both_held() {
        let mut state = test_state();
        let input = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.player.vel.x, PLAYER_SPEED);
    }

    #[test]
    fn test_horizontal_wrap() {
        let mut state = test_state();
        state.player.pos.x = -state.player.size.x - 10.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.pos.x, state.bounds.x);

        let mut state = test_state();
        state.player.pos.x = state.bounds.x + 10.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.pos.x, -state.player.size.x);
    }

    #[test]
    fn test_jump_requires_ground() {
        let mut state = test_state();
        drop_onto(&mut state, 0);

        // Tap while grounded launches
        let input = TickInput {
            jump_tap: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert!(!state.player.on_ground);
        assert!(state.player.vel.y < 0.0);
        let rising_vy = state.player.vel.y;

        // Tap while airborne does nothing
        tick(&mut state, &input);
        assert!(state.player.vel.y > rising_vy); // only gravity applied
    }

    #[test]
    fn test_paused_tick_is_inert() {
        let mut state = test_state();
        state.phase = GamePhase::Paused;
        let before = state.player.pos;
        let events = tick(&mut state, &TickInput::default());
        assert!(events.is_empty());
        assert_eq!(state.player.pos, before);
        assert_eq!(state.phase, GamePhase::Paused);
    }

    #[test]
    fn test_game_over_fires_once() {
        let mut state = test_state();
        state.score = 42;
        state.player.pos.y = state.bounds.y + 100.0;
        state.player.vel = Vec2::ZERO;
        state.player.on_ground = false;

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::GameOver { score: 42 }));

        // The loop is dead now; nothing further is emitted
        let events = tick(&mut state, &TickInput::default());
        assert!(events.is_empty());
    }

    #[test]
    fn test_scroll_locked_until_score() {
        let mut state = test_state();
        state.score = SCROLL_UNLOCK_SCORE;
        let base_y = state.platforms[0].pos.y;
        drop_onto(&mut state, 0);
        assert_eq!(state.platforms[0].pos.y, base_y);

        state.score = SCROLL_UNLOCK_SCORE + 1;
        tick(&mut state, &TickInput::default());
        assert!(state.platforms[0].pos.y > base_y);
        assert!(state.scroll_y > 0.0);
    }

    #[test]
    fn test_cull_spares_base() {
        let mut state = test_state();
        let cull_line = state.bounds.y + CULL_MARGIN;
        state.platforms[0].pos.y = cull_line + 100.0;
        state.platforms[1].pos.y = cull_line + 100.0;
        // Keep the player airborne far from everything
        state.player.pos = Vec2::new(0.0, 100.0);
        state.player.vel = Vec2::ZERO;

        tick(&mut state, &TickInput::default());
        assert!(state.platforms.iter().any(|p| p.base));
        assert!(!state.platforms.iter().any(|p| p.index == 1));
    }

    #[test]
    fn test_moving_platform_bounces_at_edges() {
        let mut state = test_state();
        state.platform_speed = 2.0;
        let platform = &mut state.platforms[5];
        platform.moving = true;
        platform.dir = 1.0;
        platform.pos.x = state.bounds.x - platform.size.x + 1.0;
        state.player.pos = Vec2::new(0.0, 100.0);
        state.player.vel = Vec2::ZERO;

        tick(&mut state, &TickInput::default());
        assert_eq!(state.platforms[5].dir, -1.0);
    }

    #[test]
    fn test_moving_platform_carries_rider() {
        let mut state = test_state();
        state.platforms[3].moving = true;
        state.platforms[3].dir = 1.0;
        drop_onto(&mut state, 3);

        state.platform_speed = 1.5;
        let x_before = state.player.pos.x;
        tick(&mut state, &TickInput::default());
        assert!((state.player.pos.x - (x_before + 1.5)).abs() < 1e-4);
    }

    #[test]
    fn test_spawn_fills_room_above() {
        let mut state = test_state();
        // Fresh layout tops out at y=40, so nothing spawns
        let count = state.platforms.len();
        state.player.pos = Vec2::new(0.0, 300.0);
        state.player.vel = Vec2::ZERO;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.platforms.len(), count);

        // Open a gap at the top
        state.platforms.remove(7);
        let highest = state
            .platforms
            .iter()
            .map(|p| p.pos.y)
            .fold(f32::INFINITY, f32::min);
        assert!(highest > SPAWN_MARGIN);

        tick(&mut state, &TickInput::default());
        let spawned = state.platforms.last().unwrap();
        assert_eq!(spawned.pos.y, highest - PLATFORM_GAP);
        assert_eq!(spawned.index, 8);
        assert!(!spawned.moving); // score far below the motion ramp
    }

    #[test]
    fn test_spin_accumulates_airborne_and_resets_grounded() {
        let mut state = test_state();
        state.player.pos = Vec2::new(100.0, 100.0);
        state.player.vel = Vec2::ZERO;
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        tick(&mut state, &input);
        assert!(state.player.angle > 0.0);
        assert_eq!(state.player.spin_dir, 1.0);

        drop_onto(&mut state, 0);
        assert_eq!(state.player.angle, 0.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = test_state();
        let mut b = test_state();
        let inputs = [
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput {
                jump_tap: true,
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                left: true,
                jump_held: true,
                ..Default::default()
            },
        ];
        for _ in 0..50 {
            for input in &inputs {
                tick(&mut a, input);
                tick(&mut b, input);
            }
        }
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.score, b.score);
        assert_eq!(a.platforms.len(), b.platforms.len());
    }
}
