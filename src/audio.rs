//! Audio playback over shell-provided media elements
//!
//! The shell owns the audio elements (background music, click, land); this
//! module only applies volume/mute state and triggers playback. Autoplay
//! rejections are swallowed and retried on the next user gesture.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use crate::settings::AudioPrefs;
use crate::storage::Store;

pub const CLICK_VOLUME: f32 = 1.0;
pub const LAND_VOLUME: f32 = 1.0;

/// Element ids the shell provides; missing elements disable that channel.
const BGM_ID: &str = "bgmAudio";
const CLICK_ID: &str = "clickAudio";
const LAND_ID: &str = "landAudio";

pub struct AudioDirector {
    bgm: Option<HtmlAudioElement>,
    click: Option<HtmlAudioElement>,
    land: Option<HtmlAudioElement>,
    pub prefs: AudioPrefs,
    /// Set when autoplay was blocked; cleared by the next user gesture
    retry_bgm: Rc<Cell<bool>>,
}

impl AudioDirector {
    pub fn new(store: &Store) -> Self {
        let document = web_sys::window().and_then(|w| w.document());
        let element = |id: &str| -> Option<HtmlAudioElement> {
            document
                .as_ref()?
                .get_element_by_id(id)?
                .dyn_into::<HtmlAudioElement>()
                .ok()
        };

        let director = Self {
            bgm: element(BGM_ID),
            click: element(CLICK_ID),
            land: element(LAND_ID),
            prefs: AudioPrefs::load(store),
            retry_bgm: Rc::new(Cell::new(false)),
        };
        if director.bgm.is_none() {
            log::warn!("No background music element - music disabled");
        }
        director.apply_music_prefs();
        director
    }

    fn apply_music_prefs(&self) {
        if let Some(bgm) = &self.bgm {
            bgm.set_volume(self.prefs.music_volume as f64);
            bgm.set_muted(self.prefs.music_muted);
        }
    }

    pub fn set_music_volume(&mut self, store: &Store, volume: f32) {
        self.prefs.set_music_volume(store, volume);
        self.apply_music_prefs();
    }

    pub fn toggle_music_muted(&mut self, store: &Store) -> bool {
        let muted = !self.prefs.music_muted;
        self.prefs.set_music_muted(store, muted);
        self.apply_music_prefs();
        muted
    }

    pub fn set_sfx_volume(&mut self, store: &Store, volume: f32) {
        self.prefs.set_sfx_volume(store, volume);
    }

    pub fn toggle_sfx_muted(&mut self, store: &Store) -> bool {
        let muted = !self.prefs.sfx_muted;
        self.prefs.set_sfx_muted(store, muted);
        muted
    }

    /// Start the music unless muted or silent. A rejected play (autoplay
    /// policy) arms a retry for the next user gesture.
    pub fn play_bgm_if_allowed(&self) {
        let Some(bgm) = &self.bgm else { return };
        if self.prefs.music_muted || self.prefs.music_volume <= 0.0 {
            return;
        }
        if let Ok(promise) = bgm.play() {
            let retry = self.retry_bgm.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if JsFuture::from(promise).await.is_err() {
                    log::info!("Autoplay blocked; will retry on user gesture");
                    retry.set(true);
                }
            });
        }
    }

    pub fn pause_bgm(&self) {
        if let Some(bgm) = &self.bgm {
            if !bgm.paused() {
                let _ = bgm.pause();
            }
        }
    }

    /// Called from input handlers; retries blocked music playback once.
    pub fn on_user_gesture(&self) {
        if self.retry_bgm.take() {
            self.play_bgm_if_allowed();
        }
    }

    fn play_effect(&self, element: &Option<HtmlAudioElement>, base_volume: f32) {
        let gain = base_volume * self.prefs.sfx_gain();
        if gain <= 0.0 {
            return;
        }
        let Some(element) = element else { return };
        element.set_volume(gain as f64);
        element.set_current_time(0.0);
        // Play rejections (autoplay policy) must never reach the loop
        if let Ok(promise) = element.play() {
            wasm_bindgen_futures::spawn_local(async move {
                let _ = JsFuture::from(promise).await;
            });
        }
    }

    pub fn play_click(&self) {
        self.play_effect(&self.click, CLICK_VOLUME);
    }

    pub fn play_land(&self) {
        self.play_effect(&self.land, LAND_VOLUME);
    }
}
