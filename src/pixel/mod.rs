//! Avatar customization
//!
//! The player is either a solid color or a 20x20 pixel-art grid. Five art
//! slots are kept independently in storage; grids of other sizes (older
//! builds, imported files) are resampled to the canonical size with
//! nearest-neighbor mapping so migration is lossy but deterministic.

pub mod editor;

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::storage::{Store, keys};

pub use editor::{Brush, BrushShape, Stroke};

/// Canonical grid edge length
pub const PIXEL_GRID: usize = 20;
/// Cells per grid
pub const PIXEL_CELLS: usize = PIXEL_GRID * PIXEL_GRID;
/// Independently stored designs
pub const PIXEL_SLOTS: usize = 5;
/// Default player color
pub const DEFAULT_COLOR: &str = "#1E90FF";

/// Solid colors offered by the picker
pub const COLOR_CHOICES: [&str; 6] = [
    "#1E90FF", "#FF4136", "#2ECC40", "#FFDC00", "#B10DC9", "#FF851B",
];

/// Editor palette (6x4 grid of swatches)
pub const EDITOR_PALETTE: [&str; 24] = [
    "#000000", "#FFFFFF", "#444444", "#BDBDBD", "#9B1B30", "#8B4513",
    "#E53935", "#FFB3BA", "#FF9800", "#D7A97B", "#F4C430", "#FFEB3B",
    "#FFF59D", "#B2FF59", "#C8E6C9", "#43A047", "#00BCD4", "#B3E5FC",
    "#448AFF", "#7986CB", "#283593", "#546E7A", "#7E57C2", "#B39DDB",
];

/// One grid cell. Serialized as `0` when empty and as the hex color string
/// when filled, matching the stored/export format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(String),
}

impl Cell {
    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            Cell::Empty => None,
            Cell::Filled(color) => Some(color),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_u32(0),
            Cell::Filled(color) => serializer.serialize_str(color),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = Cell;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("0 or a color string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Cell, E> {
                if value.is_empty() {
                    Ok(Cell::Empty)
                } else {
                    Ok(Cell::Filled(value.to_string()))
                }
            }

            // Legacy grids stored booleans/numbers; any truthy value becomes
            // the default color.
            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Cell, E> {
                Ok(if value {
                    Cell::Filled(DEFAULT_COLOR.to_string())
                } else {
                    Cell::Empty
                })
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Cell, E> {
                self.visit_bool(value != 0)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Cell, E> {
                self.visit_bool(value != 0)
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Cell, E> {
                self.visit_bool(value != 0.0)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Cell, E> {
                Ok(Cell::Empty)
            }

            fn visit_none<E: de::Error>(self) -> Result<Cell, E> {
                Ok(Cell::Empty)
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

/// A 20x20 pixel-art grid. Always exactly [`PIXEL_CELLS`] cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PixelArt {
    cells: Vec<Cell>,
}

impl Default for PixelArt {
    fn default() -> Self {
        Self::empty()
    }
}

impl PixelArt {
    pub fn empty() -> Self {
        Self {
            cells: vec![Cell::Empty; PIXEL_CELLS],
        }
    }

    pub fn filled(color: &str) -> Self {
        Self {
            cells: vec![Cell::Filled(color.to_string()); PIXEL_CELLS],
        }
    }

    /// Nearest-neighbor resample from an N x N source grid. Returns `None`
    /// when the input length is not a perfect square. N = 20 is the identity.
    pub fn resample(source: &[Cell]) -> Option<Self> {
        let n = (source.len() as f64).sqrt().round() as usize;
        if n == 0 || n * n != source.len() {
            return None;
        }
        let mut cells = Vec::with_capacity(PIXEL_CELLS);
        for y in 0..PIXEL_GRID {
            for x in 0..PIXEL_GRID {
                let sx = x * n / PIXEL_GRID;
                let sy = y * n / PIXEL_GRID;
                cells.push(source[sy * n + sx].clone());
            }
        }
        Some(Self { cells })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell accessor; out-of-range coordinates read as empty.
    pub fn get(&self, x: i32, y: i32) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        if x < 0 || y < 0 || x >= PIXEL_GRID as i32 || y >= PIXEL_GRID as i32 {
            return EMPTY;
        }
        &self.cells[y as usize * PIXEL_GRID + x as usize]
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < PIXEL_GRID && y < PIXEL_GRID {
            self.cells[y * PIXEL_GRID + x] = cell;
        }
    }
}

/// How the player sprite is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Color,
    Pixel,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Color => "color",
            RenderMode::Pixel => "pixel",
        }
    }

    /// Anything that is not exactly "pixel" reads as color mode.
    pub fn from_str(s: &str) -> Self {
        if s == "pixel" {
            RenderMode::Pixel
        } else {
            RenderMode::Color
        }
    }
}

/// Portable export envelope for one pixel-art slot
#[derive(Debug, Serialize, Deserialize)]
pub struct PixelArtExport {
    pub app: String,
    pub kind: String,
    pub version: u32,
    pub grid: u32,
    pub slot: u32,
    pub pixels: Vec<Cell>,
}

pub const EXPORT_APP: &str = "tower-jumper";
pub const EXPORT_KIND: &str = "pixel-art";
pub const EXPORT_VERSION: u32 = 1;

/// Why an imported file was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportError {
    /// The file is not JSON
    Parse,
    /// JSON, but neither a pixel array nor an export envelope with one,
    /// or the array is not a square grid
    Shape,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportError::Parse => f.write_str("the file is not valid JSON"),
            ImportError::Shape => {
                f.write_str("expected a pixel-art export or a square pixel array")
            }
        }
    }
}

impl std::error::Error for ImportError {}

/// Customization state over the key/value store
pub struct PixelStore<'a> {
    store: &'a Store,
}

impl<'a> PixelStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn render_mode(&self) -> RenderMode {
        RenderMode::from_str(&self.store.read_or(keys::RENDER_MODE, "color"))
    }

    pub fn set_render_mode(&self, mode: RenderMode) {
        self.store.set(keys::RENDER_MODE, mode.as_str());
    }

    pub fn color(&self) -> String {
        self.store.read_or(keys::COLOR, DEFAULT_COLOR)
    }

    pub fn set_color(&self, color: &str) {
        self.store.set(keys::COLOR, color);
    }

    /// Brush color falls back to the solid player color.
    pub fn brush_color(&self) -> String {
        match self.store.get(keys::BRUSH_COLOR) {
            Some(color) => color,
            None => self.color(),
        }
    }

    pub fn set_brush_color(&self, color: &str) {
        self.store.set(keys::BRUSH_COLOR, color);
    }

    pub fn brush_size(&self) -> u8 {
        self.store.read_i32_clamped(keys::BRUSH_SIZE, 1, 1, 5) as u8
    }

    pub fn set_brush_size(&self, size: u8) {
        self.store.write_i32_clamped(keys::BRUSH_SIZE, size as i32, 1, 5);
    }

    pub fn brush_shape(&self) -> BrushShape {
        BrushShape::from_str(&self.store.read_or(keys::BRUSH_SHAPE, "square"))
    }

    pub fn set_brush_shape(&self, shape: BrushShape) {
        self.store.set(keys::BRUSH_SHAPE, shape.as_str());
    }

    /// The full brush as currently persisted
    pub fn brush(&self) -> Brush {
        Brush {
            color: self.brush_color(),
            size: self.brush_size(),
            shape: self.brush_shape(),
        }
    }

    pub fn slot(&self) -> usize {
        self.store
            .read_i32_clamped(keys::PIXEL_SLOT, 0, 0, PIXEL_SLOTS as i32 - 1) as usize
    }

    pub fn set_slot(&self, slot: usize) -> usize {
        self.store
            .write_i32_clamped(keys::PIXEL_SLOT, slot as i32, 0, PIXEL_SLOTS as i32 - 1)
            as usize
    }

    fn slot_key(slot: usize) -> String {
        format!("{}_{}", keys::PIXEL_ART, slot)
    }

    /// A freshly initialized design: the full grid in the brush color.
    pub fn default_art(&self) -> PixelArt {
        PixelArt::filled(&self.brush_color())
    }

    /// Load a slot, migrating stored grids of other sizes. Slot 0 also
    /// checks the legacy un-suffixed key from builds without slots.
    pub fn load_slot(&self, slot: usize) -> PixelArt {
        let stored: Option<Vec<Cell>> = self.store.read_json(&Self::slot_key(slot), None);
        if let Some(cells) = stored {
            if let Some(art) = PixelArt::resample(&cells) {
                return art;
            }
            log::warn!("Pixel slot {slot} holds a non-square grid; resetting");
            return self.default_art();
        }
        if slot == 0 {
            let legacy: Option<Vec<Cell>> = self.store.read_json(keys::PIXEL_ART, None);
            if let Some(cells) = legacy {
                if let Some(art) = PixelArt::resample(&cells) {
                    return art;
                }
            }
        }
        self.default_art()
    }

    pub fn save_slot(&self, slot: usize, art: &PixelArt) {
        self.store.write_json(&Self::slot_key(slot), art);
    }

    /// Blank out a slot (persists an all-empty grid).
    pub fn clear_slot(&self, slot: usize) -> PixelArt {
        let art = PixelArt::empty();
        self.save_slot(slot, &art);
        art
    }

    pub fn load_active(&self) -> PixelArt {
        self.load_slot(self.slot())
    }

    pub fn save_active(&self, art: &PixelArt) {
        self.save_slot(self.slot(), art);
    }

    /// Export the given design as the portable JSON envelope.
    pub fn export(&self, slot: usize, art: &PixelArt) -> Option<String> {
        let payload = PixelArtExport {
            app: EXPORT_APP.to_string(),
            kind: EXPORT_KIND.to_string(),
            version: EXPORT_VERSION,
            grid: PIXEL_GRID as u32,
            slot: slot as u32,
            pixels: art.cells.clone(),
        };
        serde_json::to_string(&payload).ok()
    }

    /// Import a JSON document: either a bare cell array or an export
    /// envelope. The result is migrated to 20x20 and persisted into the
    /// active slot; on rejection nothing changes.
    pub fn import_active(&self, text: &str) -> Result<PixelArt, ImportError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|_| ImportError::Parse)?;
        let pixels = if value.is_array() {
            value
        } else {
            match value.get("pixels") {
                Some(pixels) if pixels.is_array() => pixels.clone(),
                _ => return Err(ImportError::Shape),
            }
        };
        let cells: Vec<Cell> =
            serde_json::from_value(pixels).map_err(|_| ImportError::Shape)?;
        let art = PixelArt::resample(&cells).ok_or(ImportError::Shape)?;
        self.save_active(&art);
        Ok(art)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_wire_format() {
        let cells: Vec<Cell> = serde_json::from_str(r##"[0, "#FF0000", "", null, true, 2]"##).unwrap();
        assert_eq!(cells[0], Cell::Empty);
        assert_eq!(cells[1], Cell::Filled("#FF0000".to_string()));
        assert_eq!(cells[2], Cell::Empty);
        assert_eq!(cells[3], Cell::Empty);
        assert_eq!(cells[4], Cell::Filled(DEFAULT_COLOR.to_string()));
        assert_eq!(cells[5], Cell::Filled(DEFAULT_COLOR.to_string()));

        let json = serde_json::to_string(&cells[..2]).unwrap();
        assert_eq!(json, r##"[0,"#FF0000"]"##);
    }

    #[test]
    fn test_resample_identity_at_canonical_size() {
        let mut source = vec![Cell::Empty; PIXEL_CELLS];
        source[21] = Cell::Filled("#123456".to_string());
        let art = PixelArt::resample(&source).unwrap();
        assert_eq!(art.cells(), &source[..]);
    }

    #[test]
    fn test_resample_always_yields_canonical_cells() {
        for n in [1usize, 4, 10, 16, 25, 40] {
            let source = vec![Cell::Filled("#fff".to_string()); n * n];
            let art = PixelArt::resample(&source).unwrap();
            assert_eq!(art.cells().len(), PIXEL_CELLS);
        }
    }

    #[test]
    fn test_resample_rejects_non_square() {
        assert!(PixelArt::resample(&vec![Cell::Empty; 399]).is_none());
        assert!(PixelArt::resample(&[]).is_none());
    }

    #[test]
    fn test_resample_nearest_neighbor_upscale() {
        // 2x2 source: left half red, right half blue
        let red = Cell::Filled("#f00".to_string());
        let blue = Cell::Filled("#00f".to_string());
        let source = vec![red.clone(), blue.clone(), red.clone(), blue.clone()];
        let art = PixelArt::resample(&source).unwrap();
        assert_eq!(*art.get(0, 0), red);
        assert_eq!(*art.get(9, 19), red);
        assert_eq!(*art.get(10, 0), blue);
        assert_eq!(*art.get(19, 19), blue);
    }

    #[test]
    fn test_slot_index_clamped() {
        let store = Store::new();
        let pixels = PixelStore::new(&store);
        assert_eq!(pixels.set_slot(99), PIXEL_SLOTS - 1);
        assert_eq!(pixels.slot(), PIXEL_SLOTS - 1);
        store.set(keys::PIXEL_SLOT, "-3");
        assert_eq!(pixels.slot(), 0);
    }

    #[test]
    fn test_missing_slot_defaults_to_brush_color() {
        let store = Store::new();
        let pixels = PixelStore::new(&store);
        pixels.set_brush_color("#ABCDEF");
        let art = pixels.load_slot(2);
        assert!(art.cells().iter().all(|c| c.color() == Some("#ABCDEF")));
    }

    #[test]
    fn test_legacy_key_migrates_into_slot_zero() {
        let store = Store::new();
        let legacy = vec![Cell::Filled("#333".to_string()); 100]; // old 10x10 grid
        store.write_json(keys::PIXEL_ART, &legacy);

        let pixels = PixelStore::new(&store);
        let art = pixels.load_slot(0);
        assert_eq!(art.cells().len(), PIXEL_CELLS);
        assert!(art.cells().iter().all(|c| c.color() == Some("#333")));

        // Other slots are unaffected by the legacy key
        pixels.set_brush_color("#111");
        let other = pixels.load_slot(1);
        assert!(other.cells().iter().all(|c| c.color() == Some("#111")));
    }

    #[test]
    fn test_slot_roundtrip() {
        let store = Store::new();
        let pixels = PixelStore::new(&store);
        let mut art = PixelArt::empty();
        art.set(3, 4, Cell::Filled("#BADA55".to_string()));
        pixels.save_slot(1, &art);
        assert_eq!(pixels.load_slot(1), art);
    }

    #[test]
    fn test_clear_slot_persists_empty_grid() {
        let store = Store::new();
        let pixels = PixelStore::new(&store);
        pixels.save_slot(2, &PixelArt::filled("#123"));
        let cleared = pixels.clear_slot(2);
        assert!(cleared.cells().iter().all(|c| !c.is_filled()));
        assert_eq!(pixels.load_slot(2), cleared);
    }

    #[test]
    fn test_export_envelope_schema() {
        let store = Store::new();
        let pixels = PixelStore::new(&store);
        let art = PixelArt::empty();
        let json = pixels.export(3, &art).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["app"], "tower-jumper");
        assert_eq!(value["kind"], "pixel-art");
        assert_eq!(value["version"], 1);
        assert_eq!(value["grid"], 20);
        assert_eq!(value["slot"], 3);
        assert_eq!(value["pixels"].as_array().unwrap().len(), PIXEL_CELLS);
    }

    #[test]
    fn test_import_accepts_bare_array_and_envelope() {
        let store = Store::new();
        let pixels = PixelStore::new(&store);

        let bare = serde_json::to_string(&vec![Cell::Empty; PIXEL_CELLS]).unwrap();
        let art = pixels.import_active(&bare).unwrap();
        assert_eq!(art.cells().len(), PIXEL_CELLS);

        let mut design = PixelArt::empty();
        design.set(0, 0, Cell::Filled("#f00".to_string()));
        let envelope = pixels.export(0, &design).unwrap();
        let art = pixels.import_active(&envelope).unwrap();
        assert_eq!(art, design);
        // Import lands in the active slot
        assert_eq!(pixels.load_active(), design);
    }

    #[test]
    fn test_import_rejects_garbage() {
        let store = Store::new();
        let pixels = PixelStore::new(&store);
        assert_eq!(pixels.import_active("not json"), Err(ImportError::Parse));
        assert_eq!(
            pixels.import_active(r#"{"kind":"other"}"#),
            Err(ImportError::Shape)
        );
        assert_eq!(
            pixels.import_active(r#"{"pixels": 5}"#),
            Err(ImportError::Shape)
        );
        // Non-square array
        assert_eq!(pixels.import_active("[0,0,0]"), Err(ImportError::Shape));
        // Rejection leaves the active slot untouched
        assert!(store.get(&PixelStore::slot_key(0)).is_none());
    }
}
