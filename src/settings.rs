//! Theme state, the settings panel, and audio preferences
//!
//! Theme changes publish synchronously to registered observers; the sim's
//! render colors are refreshed through that channel. The settings panel
//! remembers whether it caused the pause so closing it never resumes a game
//! something else paused.

use crate::storage::{Store, keys};

/// Visual theme; exactly one is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Neon,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Neon => "neon",
        }
    }

    /// Unknown persisted values fall back to the default theme.
    pub fn from_str(s: &str) -> Self {
        match s {
            "dark" => Theme::Dark,
            "light" => Theme::Light,
            "neon" => Theme::Neon,
            _ => Theme::Dark,
        }
    }

    /// CSS class applied to the document body
    pub fn body_class(&self) -> &'static str {
        match self {
            Theme::Dark => "theme-dark",
            Theme::Light => "theme-light",
            Theme::Neon => "theme-neon",
        }
    }

    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::Neon];
}

type ThemeObserver = Box<dyn Fn(Theme)>;

/// Active theme plus its observer list
pub struct ThemeState {
    current: Theme,
    observers: Vec<ThemeObserver>,
}

impl ThemeState {
    pub fn load(store: &Store) -> Self {
        let current = Theme::from_str(&store.read_or(keys::THEME, "dark"));
        Self {
            current,
            observers: Vec::new(),
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn subscribe(&mut self, observer: impl Fn(Theme) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Switch theme. Persists and notifies every observer synchronously,
    /// but only when the theme actually changed. Returns whether it did.
    pub fn set(&mut self, theme: Theme, store: &Store) -> bool {
        if theme == self.current {
            return false;
        }
        self.current = theme;
        store.set(keys::THEME, theme.as_str());
        for observer in &self.observers {
            observer(theme);
        }
        true
    }
}

/// Modal settings panel open/close state.
///
/// Opening pauses the game only if it was running, and remembers that it
/// did; closing resumes only if the panel caused the pause and the game is
/// still paused.
#[derive(Debug, Default)]
pub struct SettingsPanel {
    open: bool,
    paused_by_panel: bool,
}

impl SettingsPanel {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true when the caller should pause the game.
    pub fn open(&mut self, game_paused: bool) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        self.paused_by_panel = !game_paused;
        self.paused_by_panel
    }

    /// Returns true when the caller should resume the game.
    pub fn close(&mut self, game_paused: bool) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        let resume = self.paused_by_panel && game_paused;
        self.paused_by_panel = false;
        resume
    }
}

/// Persisted audio preferences
#[derive(Debug, Clone, Copy)]
pub struct AudioPrefs {
    /// Background music volume, 0..1
    pub music_volume: f32,
    pub music_muted: bool,
    /// Sound-effect volume, 0..1
    pub sfx_volume: f32,
    pub sfx_muted: bool,
}

impl AudioPrefs {
    pub fn load(store: &Store) -> Self {
        Self {
            music_volume: store.read_f32_clamped(keys::MUSIC_VOLUME, 0.5, 0.0, 1.0),
            music_muted: store.read_flag(keys::MUSIC_MUTED, false),
            sfx_volume: store.read_f32_clamped(keys::SFX_VOLUME, 1.0, 0.0, 1.0),
            sfx_muted: store.read_flag(keys::SFX_MUTED, false),
        }
    }

    pub fn set_music_volume(&mut self, store: &Store, volume: f32) {
        self.music_volume = store.write_f32_clamped(keys::MUSIC_VOLUME, volume, 0.0, 1.0);
    }

    pub fn set_music_muted(&mut self, store: &Store, muted: bool) {
        self.music_muted = muted;
        store.write_flag(keys::MUSIC_MUTED, muted);
    }

    pub fn set_sfx_volume(&mut self, store: &Store, volume: f32) {
        self.sfx_volume = store.write_f32_clamped(keys::SFX_VOLUME, volume, 0.0, 1.0);
    }

    pub fn set_sfx_muted(&mut self, store: &Store, muted: bool) {
        self.sfx_muted = muted;
        store.write_flag(keys::SFX_MUTED, muted);
    }

    /// Effective sfx gain, zero while muted
    pub fn sfx_gain(&self) -> f32 {
        if self.sfx_muted { 0.0 } else { self.sfx_volume }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_theme_from_str_falls_back() {
        assert_eq!(Theme::from_str("neon"), Theme::Neon);
        assert_eq!(Theme::from_str("sepia"), Theme::Dark);
        assert_eq!(Theme::from_str(""), Theme::Dark);
    }

    #[test]
    fn test_theme_persists_and_notifies_on_change_only() {
        let store = Store::new();
        let mut themes = ThemeState::load(&store);
        assert_eq!(themes.current(), Theme::Dark);

        let notified = Rc::new(Cell::new(0u32));
        let counter = notified.clone();
        themes.subscribe(move |_| counter.set(counter.get() + 1));

        assert!(themes.set(Theme::Neon, &store));
        assert_eq!(notified.get(), 1);
        assert_eq!(store.read_or(keys::THEME, "dark"), "neon");

        // Re-selecting the active theme is a no-op
        assert!(!themes.set(Theme::Neon, &store));
        assert_eq!(notified.get(), 1);

        // The persisted choice survives a reload
        let themes = ThemeState::load(&store);
        assert_eq!(themes.current(), Theme::Neon);
    }

    #[test]
    fn test_panel_pauses_running_game_and_resumes_it() {
        let mut panel = SettingsPanel::default();
        assert!(panel.open(false)); // game running -> pause it
        assert!(panel.is_open());
        assert!(panel.close(true)); // still paused -> resume it
        assert!(!panel.is_open());
    }

    #[test]
    fn test_panel_leaves_externally_paused_game_alone() {
        let mut panel = SettingsPanel::default();
        assert!(!panel.open(true)); // already paused -> not our pause
        assert!(!panel.close(true)); // so closing must not resume
    }

    #[test]
    fn test_panel_skips_resume_if_unpaused_while_open() {
        let mut panel = SettingsPanel::default();
        assert!(panel.open(false));
        // Something resumed the game while the panel was open
        assert!(!panel.close(false));
    }

    #[test]
    fn test_panel_double_open_close() {
        let mut panel = SettingsPanel::default();
        assert!(panel.open(false));
        assert!(!panel.open(false)); // already open
        assert!(panel.close(true));
        assert!(!panel.close(true)); // already closed
    }

    #[test]
    fn test_audio_prefs_clamp_and_roundtrip() {
        let store = Store::new();
        let mut prefs = AudioPrefs::load(&store);
        assert_eq!(prefs.music_volume, 0.5);
        assert_eq!(prefs.sfx_volume, 1.0);

        prefs.set_music_volume(&store, 1.8);
        assert_eq!(prefs.music_volume, 1.0);
        prefs.set_sfx_muted(&store, true);
        assert_eq!(prefs.sfx_gain(), 0.0);

        let reloaded = AudioPrefs::load(&store);
        assert_eq!(reloaded.music_volume, 1.0);
        assert!(reloaded.sfx_muted);
    }
}
