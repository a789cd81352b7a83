//! Brush and stroke mechanics for the pixel-art editor
//!
//! A stroke decides between painting and erasing once, at pointer-down,
//! based on the cell under the cursor: starting on a filled cell makes the
//! whole stroke erase, starting on an empty cell makes it paint the brush
//! color. The brush footprint is applied at every cell the stroke visits.

use super::{Cell, PIXEL_GRID, PixelArt};

/// Brush aperture shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushShape {
    #[default]
    Square,
    Circle,
}

impl BrushShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrushShape::Square => "square",
            BrushShape::Circle => "circle",
        }
    }

    /// Anything that is not exactly "circle" reads as square.
    pub fn from_str(s: &str) -> Self {
        if s == "circle" {
            BrushShape::Circle
        } else {
            BrushShape::Square
        }
    }
}

/// Brush settings, independent of the active slot
#[derive(Debug, Clone)]
pub struct Brush {
    pub color: String,
    /// Aperture size in cells, 1..=5
    pub size: u8,
    pub shape: BrushShape,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: super::DEFAULT_COLOR.to_string(),
            size: 1,
            shape: BrushShape::Square,
        }
    }
}

/// One continuous paint gesture
#[derive(Debug, Clone)]
pub struct Stroke {
    paint: Cell,
}

impl Stroke {
    /// Fix the stroke's paint value from the cell under the pointer-down.
    pub fn begin(art: &PixelArt, x: i32, y: i32, brush: &Brush) -> Self {
        let paint = if art.get(x, y).is_filled() {
            Cell::Empty
        } else {
            Cell::Filled(brush.color.clone())
        };
        Self { paint }
    }

    /// Whether this stroke paints (as opposed to erases)
    pub fn paints(&self) -> bool {
        self.paint.is_filled()
    }

    /// Stamp the brush aperture centered (best-effort for even sizes) on
    /// the given cell. Returns whether any cell changed.
    pub fn apply(&self, art: &mut PixelArt, x: i32, y: i32, brush: &Brush) -> bool {
        let size = brush.size.clamp(1, 5) as i32;
        let half_low = (size - 1) / 2;
        let half_high = size / 2;
        let radius = size as f32 / 2.0;
        let mut changed = false;

        for yy in (y - half_low)..=(y + half_high) {
            if yy < 0 || yy >= PIXEL_GRID as i32 {
                continue;
            }
            for xx in (x - half_low)..=(x + half_high) {
                if xx < 0 || xx >= PIXEL_GRID as i32 {
                    continue;
                }
                if brush.shape == BrushShape::Circle {
                    let dx = (xx - x) as f32;
                    let dy = (yy - y) as f32;
                    if dx * dx + dy * dy > radius * radius {
                        continue;
                    }
                }
                if *art.get(xx, yy) != self.paint {
                    art.set(xx as usize, yy as usize, self.paint.clone());
                    changed = true;
                }
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brush(size: u8, shape: BrushShape) -> Brush {
        Brush {
            color: "#f00".to_string(),
            size,
            shape,
        }
    }

    fn filled_count(art: &PixelArt) -> usize {
        art.cells().iter().filter(|c| c.is_filled()).count()
    }

    #[test]
    fn test_stroke_on_empty_paints_throughout() {
        let mut art = PixelArt::empty();
        // A pre-painted cell in a different color along the stroke path
        art.set(6, 5, Cell::Filled("#0f0".to_string()));

        let b = brush(1, BrushShape::Square);
        let stroke = Stroke::begin(&art, 5, 5, &b);
        assert!(stroke.paints());
        stroke.apply(&mut art, 5, 5, &b);
        stroke.apply(&mut art, 6, 5, &b);
        stroke.apply(&mut art, 7, 5, &b);

        for x in 5..=7 {
            assert_eq!(art.get(x, 5).color(), Some("#f00"));
        }
    }

    #[test]
    fn test_stroke_on_filled_erases_throughout() {
        let mut art = PixelArt::empty();
        art.set(5, 5, Cell::Filled("#0f0".to_string()));
        art.set(6, 5, Cell::Filled("#00f".to_string()));

        let b = brush(1, BrushShape::Square);
        let stroke = Stroke::begin(&art, 5, 5, &b);
        assert!(!stroke.paints());
        stroke.apply(&mut art, 5, 5, &b);
        stroke.apply(&mut art, 6, 5, &b);
        // Visiting an already-empty cell erases (keeps) it too
        stroke.apply(&mut art, 7, 5, &b);

        assert_eq!(filled_count(&art), 0);
    }

    #[test]
    fn test_square_aperture_sizes() {
        for (size, expected) in [(1u8, 1usize), (2, 4), (3, 9), (4, 16), (5, 25)] {
            let mut art = PixelArt::empty();
            let b = brush(size, BrushShape::Square);
            let stroke = Stroke::begin(&art, 10, 10, &b);
            stroke.apply(&mut art, 10, 10, &b);
            assert_eq!(filled_count(&art), expected, "size {size}");
        }
    }

    #[test]
    fn test_even_sizes_bias_down_right() {
        let mut art = PixelArt::empty();
        let b = brush(2, BrushShape::Square);
        let stroke = Stroke::begin(&art, 10, 10, &b);
        stroke.apply(&mut art, 10, 10, &b);
        for (x, y) in [(10, 10), (11, 10), (10, 11), (11, 11)] {
            assert!(art.get(x, y).is_filled());
        }
        assert!(!art.get(9, 10).is_filled());
    }

    #[test]
    fn test_circle_excludes_corners() {
        let mut art = PixelArt::empty();
        let b = brush(2, BrushShape::Circle);
        let stroke = Stroke::begin(&art, 10, 10, &b);
        stroke.apply(&mut art, 10, 10, &b);
        // radius 1: the diagonal neighbor is outside
        assert!(art.get(10, 10).is_filled());
        assert!(art.get(11, 10).is_filled());
        assert!(art.get(10, 11).is_filled());
        assert!(!art.get(11, 11).is_filled());
    }

    #[test]
    fn test_aperture_clips_at_grid_edges() {
        let mut art = PixelArt::empty();
        let b = brush(5, BrushShape::Square);
        let stroke = Stroke::begin(&art, 0, 0, &b);
        stroke.apply(&mut art, 0, 0, &b);
        // Only the 3x3 corner of the 5x5 aperture lands on the grid
        assert_eq!(filled_count(&art), 9);

        let stroke = Stroke::begin(&art, 19, 19, &b);
        // Bottom-right corner was untouched so this stroke paints
        assert!(stroke.paints());
        stroke.apply(&mut art, 19, 19, &b);
        assert_eq!(filled_count(&art), 18);
    }

    #[test]
    fn test_begin_outside_grid_paints() {
        let art = PixelArt::empty();
        let b = brush(1, BrushShape::Square);
        let stroke = Stroke::begin(&art, -1, 30, &b);
        assert!(stroke.paints());
    }
}
