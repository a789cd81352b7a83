//! Canvas-2D presentation
//!
//! Platform fills rotate through a palette in bands of 100 creation indexes;
//! the shadow and score colors are derived from the active theme. Only the
//! `CanvasRenderer` itself needs a browser; color selection is plain data.

use crate::settings::Theme;

#[cfg(target_arch = "wasm32")]
use crate::pixel::PIXEL_GRID;
#[cfg(target_arch = "wasm32")]
use crate::sim::{GameState, Skin};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Platform fill palette; the band advances every 100 platforms
pub const PLATFORM_COLORS: [&str; 7] = [
    "#32CD32", "#4FC3F7", "#FFB74D", "#BA68C8", "#E57373", "#81C784", "#FFD54F",
];

/// Fill color for a platform creation index
pub fn platform_fill(index: u32) -> &'static str {
    let band = (index / 100) as usize;
    PLATFORM_COLORS[band % PLATFORM_COLORS.len()]
}

/// Theme-derived render colors, refreshed on every theme change
#[derive(Debug, Clone)]
pub struct RenderColors {
    pub platform_shadow: &'static str,
    pub score_text: &'static str,
}

impl RenderColors {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                platform_shadow: "rgba(0, 0, 0, 0.24)",
                score_text: "#f5f8ff",
            },
            Theme::Light => Self {
                platform_shadow: "rgba(15, 23, 42, 0.18)",
                score_text: "#1f2933",
            },
            Theme::Neon => Self {
                platform_shadow: "rgba(255, 0, 229, 0.35)",
                score_text: "#39ff14",
            },
        }
    }
}

/// Immediate-mode renderer over a 2D canvas context
#[cfg(target_arch = "wasm32")]
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    colors: RenderColors,
}

#[cfg(target_arch = "wasm32")]
impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement, theme: Theme) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
            colors: RenderColors::for_theme(theme),
        })
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.colors = RenderColors::for_theme(theme);
    }

    /// Draw one frame: platforms, player, labels, score.
    pub fn render(&self, state: &GameState) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        self.draw_platforms(state);
        self.draw_player(state);
        self.draw_labels(state);
        self.draw_score(state);
    }

    fn draw_platforms(&self, state: &GameState) {
        self.ctx.save();
        self.ctx.set_shadow_color(self.colors.platform_shadow);
        self.ctx.set_shadow_blur(14.0);
        self.ctx.set_shadow_offset_x(0.0);
        self.ctx.set_shadow_offset_y(6.0);
        for platform in &state.platforms {
            self.ctx.set_fill_style_str(platform_fill(platform.index));
            self.ctx.fill_rect(
                platform.pos.x as f64,
                platform.pos.y as f64,
                platform.size.x as f64,
                platform.size.y as f64,
            );
        }
        self.ctx.restore();
    }

    fn draw_player(&self, state: &GameState) {
        let player = &state.player;
        let half_w = player.size.x as f64 / 2.0;
        let half_h = player.size.y as f64 / 2.0;

        self.ctx.save();
        let _ = self
            .ctx
            .translate(player.pos.x as f64 + half_w, player.pos.y as f64 + half_h);
        let _ = self.ctx.rotate(player.angle as f64);

        match &player.skin {
            Skin::Color(color) => {
                self.ctx.set_fill_style_str(color);
                self.ctx
                    .fill_rect(-half_w, -half_h, player.size.x as f64, player.size.y as f64);
            }
            Skin::Pixel(art) => {
                self.ctx.set_image_smoothing_enabled(false);
                let cell = player.size.x as f64 / PIXEL_GRID as f64;
                for y in 0..PIXEL_GRID {
                    for x in 0..PIXEL_GRID {
                        if let Some(color) = art.get(x as i32, y as i32).color() {
                            self.ctx.set_fill_style_str(color);
                            self.ctx.fill_rect(
                                -half_w + x as f64 * cell,
                                -half_h + y as f64 * cell,
                                cell.ceil(),
                                cell.ceil(),
                            );
                        }
                    }
                }
            }
        }
        self.ctx.restore();
    }

    /// Every tenth platform shows its index as a progress marker.
    fn draw_labels(&self, state: &GameState) {
        self.ctx.save();
        self.ctx.set_font("12px sans-serif");
        self.ctx.set_text_align("right");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str("white");
        for platform in &state.platforms {
            if !platform.base && platform.index > 0 && platform.index % 10 == 0 {
                let _ = self.ctx.fill_text(
                    &platform.index.to_string(),
                    (platform.pos.x + platform.size.x - 4.0) as f64,
                    (platform.pos.y + platform.size.y / 2.0) as f64,
                );
            }
        }
        self.ctx.restore();
    }

    fn draw_score(&self, state: &GameState) {
        self.ctx.set_fill_style_str(self.colors.score_text);
        self.ctx.set_font("bold 24px sans-serif");
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("top");
        let _ = self
            .ctx
            .fill_text(&format!("Score: {}", state.score), self.width / 2.0, 10.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_fill_bands_rotate_every_hundred() {
        assert_eq!(platform_fill(0), PLATFORM_COLORS[0]);
        assert_eq!(platform_fill(99), PLATFORM_COLORS[0]);
        assert_eq!(platform_fill(100), PLATFORM_COLORS[1]);
        assert_eq!(platform_fill(650), PLATFORM_COLORS[6]);
        // Wraps around after the palette is exhausted
        assert_eq!(platform_fill(700), PLATFORM_COLORS[0]);
    }

    #[test]
    fn test_each_theme_has_distinct_score_color() {
        let dark = RenderColors::for_theme(Theme::Dark);
        let light = RenderColors::for_theme(Theme::Light);
        let neon = RenderColors::for_theme(Theme::Neon);
        assert_ne!(dark.score_text, light.score_text);
        assert_ne!(light.score_text, neon.score_text);
    }
}
