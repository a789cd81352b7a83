//! Exception-safe key/value persistence
//!
//! Wraps LocalStorage on wasm; native builds get an in-memory map so the
//! persistence-facing modules are testable on the host. Every read failure
//! collapses to the caller's fallback and every write failure is dropped -
//! storage trouble must never reach the game loop.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Logical names for everything the game persists.
pub mod keys {
    pub const MUSIC_VOLUME: &str = "towerJumperMusicVolume";
    pub const MUSIC_MUTED: &str = "towerJumperMusicMuted";
    pub const SFX_VOLUME: &str = "towerJumperSfxVolume";
    pub const SFX_MUTED: &str = "towerJumperSfxMuted";
    pub const HIGH_SCORES: &str = "towerJumperHighScores";
    pub const PLAYER_NAME: &str = "towerJumperPlayerName";
    pub const COLOR: &str = "towerJumperColor";
    pub const BRUSH_COLOR: &str = "towerJumperBrushColor";
    pub const BRUSH_SIZE: &str = "towerJumperBrushSize";
    pub const BRUSH_SHAPE: &str = "towerJumperBrushShape";
    pub const RENDER_MODE: &str = "towerJumperRenderMode";
    /// Legacy slot-0 location; slots append `_N`
    pub const PIXEL_ART: &str = "towerJumperPixelArt";
    pub const PIXEL_SLOT: &str = "towerJumperPixelSlot";
    pub const THEME: &str = "towerJumperTheme";
}

/// Key/value store over the platform's local storage.
pub struct Store {
    #[cfg(target_arch = "wasm32")]
    backend: Option<web_sys::Storage>,
    #[cfg(not(target_arch = "wasm32"))]
    backend: std::cell::RefCell<std::collections::HashMap<String, String>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        let backend = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if backend.is_none() {
            log::warn!("LocalStorage unavailable - settings will not persist");
        }
        Self { backend }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            backend: std::cell::RefCell::new(std::collections::HashMap::new()),
        }
    }

    /// Raw read; any storage exception reads as absent.
    #[cfg(target_arch = "wasm32")]
    pub fn get(&self, key: &str) -> Option<String> {
        self.backend.as_ref()?.get_item(key).ok().flatten()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn get(&self, key: &str) -> Option<String> {
        self.backend.borrow().get(key).cloned()
    }

    /// Raw write; quota and availability errors are dropped.
    #[cfg(target_arch = "wasm32")]
    pub fn set(&self, key: &str, value: &str) {
        if let Some(backend) = &self.backend {
            let _ = backend.set_item(key, value);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn set(&self, key: &str, value: &str) {
        self.backend
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    /// Read a string with a fallback for absent values.
    pub fn read_or(&self, key: &str, fallback: &str) -> String {
        self.get(key).unwrap_or_else(|| fallback.to_string())
    }

    /// Read a float, clamped to `[min, max]`; unparseable values read as the fallback.
    pub fn read_f32_clamped(&self, key: &str, fallback: f32, min: f32, max: f32) -> f32 {
        let value = self
            .get(key)
            .and_then(|raw| raw.parse::<f32>().ok())
            .unwrap_or(fallback);
        value.clamp(min, max)
    }

    pub fn write_f32_clamped(&self, key: &str, value: f32, min: f32, max: f32) -> f32 {
        let clamped = value.clamp(min, max);
        self.set(key, &clamped.to_string());
        clamped
    }

    /// Read an integer, clamped to `[min, max]`; unparseable values read as the fallback.
    pub fn read_i32_clamped(&self, key: &str, fallback: i32, min: i32, max: i32) -> i32 {
        let value = self
            .get(key)
            .and_then(|raw| raw.parse::<i32>().ok())
            .unwrap_or(fallback);
        value.clamp(min, max)
    }

    /// Returns the value actually stored.
    pub fn write_i32_clamped(&self, key: &str, value: i32, min: i32, max: i32) -> i32 {
        let clamped = value.clamp(min, max);
        self.set(key, &clamped.to_string());
        clamped
    }

    /// Boolean flags are stored as "1"/"0".
    pub fn read_flag(&self, key: &str, fallback: bool) -> bool {
        match self.get(key) {
            Some(raw) => raw == "1",
            None => fallback,
        }
    }

    pub fn write_flag(&self, key: &str, value: bool) {
        self.set(key, if value { "1" } else { "0" });
    }

    /// Read a JSON value; parse failures read as the fallback.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.get(key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("Discarding corrupt JSON under {key}: {err}");
                    fallback
                }
            },
            None => fallback,
        }
    }

    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        if let Ok(json) = serde_json::to_string(value) {
            self.set(key, &json);
        }
    }
}
