//! Tower Jumper entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! shell/UI may drive the game through three entry points: `start_game`,
//! `resume_game`, and `toggle_pause`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{Element, HtmlCanvasElement, HtmlInputElement};

    use tower_jumper::audio::AudioDirector;
    use tower_jumper::consts::*;
    use tower_jumper::highscores::{self, HighScores};
    use tower_jumper::pixel::{PixelStore, RenderMode};
    use tower_jumper::render::CanvasRenderer;
    use tower_jumper::settings::{SettingsPanel, Theme, ThemeState};
    use tower_jumper::sim::{GameEvent, GamePhase, GameState, Skin, TickInput, tick};
    use tower_jumper::storage::Store;
    use tower_jumper::ui;

    thread_local! {
        static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    pub struct App {
        store: Rc<Store>,
        state: GameState,
        input: TickInput,
        renderer: Option<CanvasRenderer>,
        audio: AudioDirector,
        panel: SettingsPanel,
        raf: Option<i32>,
        /// A run exists (start was pressed at least once)
        started: bool,
    }

    pub fn with_app(f: impl FnOnce(&Rc<RefCell<App>>)) {
        APP.with(|slot| {
            if let Some(app) = slot.borrow().as_ref() {
                f(app);
            }
        });
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn by_id(id: &str) -> Option<Element> {
        document()?.get_element_by_id(id)
    }

    /// The skin the customization store currently selects.
    fn current_skin(store: &Store) -> Skin {
        let pixels = PixelStore::new(store);
        match pixels.render_mode() {
            RenderMode::Pixel => Skin::Pixel(pixels.load_active()),
            RenderMode::Color => Skin::Color(pixels.color()),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Tower Jumper starting...");

        let store = Rc::new(Store::new());
        let themes = Rc::new(RefCell::new(ThemeState::load(&store)));
        let theme = themes.borrow().current();
        ui::apply_body_theme(theme);

        let canvas: Option<HtmlCanvasElement> =
            by_id("gameCanvas").and_then(|el| el.dyn_into().ok());
        let bounds = match &canvas {
            Some(canvas) => Vec2::new(canvas.width() as f32, canvas.height() as f32),
            None => Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
        };
        let renderer = canvas
            .as_ref()
            .and_then(|canvas| CanvasRenderer::new(canvas, theme));
        if renderer.is_none() {
            log::warn!("No 2D canvas available - running without rendering");
        }

        let seed = js_sys::Date::now() as u64;
        let mut state = GameState::new(bounds, seed, current_skin(&store));
        state.phase = GamePhase::Paused; // nothing runs until Start

        let audio = AudioDirector::new(&store);
        let app = Rc::new(RefCell::new(App {
            store: store.clone(),
            state,
            input: TickInput::default(),
            renderer,
            audio,
            panel: SettingsPanel::default(),
            raf: None,
            started: false,
        }));
        APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

        ui::update_high_scores(&HighScores::load(&store));

        // Theme changes recolor the body and the renderer synchronously
        {
            let app = app.clone();
            themes.borrow_mut().subscribe(move |theme| {
                ui::apply_body_theme(theme);
                ui::mark_theme_buttons(theme);
                if let Some(renderer) = &mut app.borrow_mut().renderer {
                    renderer.set_theme(theme);
                }
            });
        }
        ui::mark_theme_buttons(theme);

        // Avatar changes land directly on the live player
        {
            let app = app.clone();
            ui::wire_customization(
                store.clone(),
                Rc::new(move |skin| {
                    app.borrow_mut().state.player.skin = skin;
                }),
            );
        }

        setup_name_input(&store);
        setup_volume_controls(&app);
        setup_settings_panel(&app, &themes);
        setup_touch_controls(&app);
        setup_input_handlers(&app);

        if let Some(button) = ui::overlay_show("Tower Jumper", "", "Start") {
            let app = app.clone();
            wire_click(&button, move || start_game(&app));
        }

        log::info!("Tower Jumper ready");
    }

    fn wire_click(element: &Element, action: impl Fn() + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| action());
        let _ = element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // === Frame clock ===

    fn schedule_frame(app_rc: &Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let app = app_rc.clone();
        let closure = Closure::once(move |_time: f64| frame(app));
        if let Ok(id) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            app_rc.borrow_mut().raf = Some(id);
        }
        closure.forget();
    }

    fn cancel_frame(app: &mut App) {
        if let Some(id) = app.raf.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    fn frame(app_rc: Rc<RefCell<App>>) {
        let mut final_score = None;
        {
            let mut app = app_rc.borrow_mut();
            app.raf = None;
            if app.state.phase != GamePhase::Playing {
                return;
            }

            let input = app.input.clone();
            let events = tick(&mut app.state, &input);
            // The tap flag is one-shot: consumed whether or not it jumped
            app.input.jump_tap = false;

            for event in events {
                match event {
                    GameEvent::Landed => app.audio.play_land(),
                    GameEvent::GameOver { score } => final_score = Some(score),
                }
            }

            if let Some(score) = final_score {
                let name = highscores::load_player_name(&app.store);
                let ledger = HighScores::record(&app.store, &name, score, js_sys::Date::now());
                ui::update_high_scores(&ledger);
            } else if let Some(renderer) = &app.renderer {
                renderer.render(&app.state);
            }
        }

        match final_score {
            Some(score) => show_game_over(&app_rc, score),
            None => schedule_frame(&app_rc),
        }
    }

    // === Entry points ===

    pub fn start_game(app_rc: &Rc<RefCell<App>>) {
        {
            let mut app = app_rc.borrow_mut();
            app.audio.play_click();
            app.audio.on_user_gesture();
            ui::overlay_hide();

            let seed = js_sys::Date::now() as u64;
            let bounds = app.state.bounds;
            let skin = current_skin(&app.store);
            app.state = GameState::new(bounds, seed, skin);
            app.input = TickInput::default();
            app.started = true;
            app.audio.play_bgm_if_allowed();
            cancel_frame(&mut app);
            log::info!("Game started with seed: {seed}");
        }
        schedule_frame(app_rc);
    }

    pub fn resume_game(app_rc: &Rc<RefCell<App>>) {
        {
            let mut app = app_rc.borrow_mut();
            if !app.started || app.state.phase != GamePhase::Paused {
                return;
            }
            app.audio.play_click();
            ui::overlay_hide();
            app.state.phase = GamePhase::Playing;
            app.audio.play_bgm_if_allowed();
            cancel_frame(&mut app);
        }
        schedule_frame(app_rc);
    }

    fn pause_game(app_rc: &Rc<RefCell<App>>) {
        let score;
        {
            let mut app = app_rc.borrow_mut();
            if app.state.phase != GamePhase::Playing {
                return;
            }
            app.state.phase = GamePhase::Paused;
            app.audio.play_click();
            score = app.state.score;
            cancel_frame(&mut app);
        }
        if let Some(button) = ui::overlay_show("Paused", &format!("Score: {score}"), "Resume") {
            let app = app_rc.clone();
            wire_click(&button, move || resume_game(&app));
        }
    }

    pub fn toggle_pause(app_rc: &Rc<RefCell<App>>) {
        let phase = {
            let app = app_rc.borrow();
            if !app.started {
                return;
            }
            app.state.phase
        };
        match phase {
            GamePhase::Playing => pause_game(app_rc),
            GamePhase::Paused => resume_game(app_rc),
            GamePhase::GameOver => {}
        }
    }

    fn show_game_over(app_rc: &Rc<RefCell<App>>, score: u32) {
        if let Some(button) =
            ui::overlay_show("Game Over", &format!("Final Score: {score}"), "Restart")
        {
            let app = app_rc.clone();
            wire_click(&button, move || start_game(&app));
        }
    }

    // === Collaborator wiring ===

    fn setup_name_input(store: &Rc<Store>) {
        let Some(input) = by_id("playerName").and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        input.set_value(&highscores::load_player_name(store));
        let store = store.clone();
        let field = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            highscores::save_player_name(&store, field.value().trim());
        });
        let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn sync_mute_label(id: &str, muted: bool) {
        if let Some(button) = by_id(id) {
            button.set_text_content(Some(if muted { "Unmute" } else { "Mute" }));
        }
    }

    fn setup_volume_controls(app_rc: &Rc<RefCell<App>>) {
        {
            let app = app_rc.borrow();
            if let Some(slider) =
                by_id("musicVolume").and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                slider.set_value(&((app.audio.prefs.music_volume * 100.0).round()).to_string());
            }
            if let Some(slider) =
                by_id("sfxVolume").and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                slider.set_value(&((app.audio.prefs.sfx_volume * 100.0).round()).to_string());
            }
            sync_mute_label("muteBtn", app.audio.prefs.music_muted);
            sync_mute_label("sfxMuteBtn", app.audio.prefs.sfx_muted);
        }

        if let Some(slider) =
            by_id("musicVolume").and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let app = app_rc.clone();
            let input = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let volume = input.value().parse::<f32>().unwrap_or(0.0).clamp(0.0, 100.0) / 100.0;
                let mut app = app.borrow_mut();
                let store = app.store.clone();
                app.audio.set_music_volume(&store, volume);
                if app.state.phase == GamePhase::Playing {
                    app.audio.play_bgm_if_allowed();
                }
            });
            let _ =
                slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(button) = by_id("muteBtn") {
            let app = app_rc.clone();
            wire_click(&button, move || {
                let mut app = app.borrow_mut();
                app.audio.play_click();
                let store = app.store.clone();
                let muted = app.audio.toggle_music_muted(&store);
                sync_mute_label("muteBtn", muted);
                if !muted && app.state.phase == GamePhase::Playing {
                    app.audio.play_bgm_if_allowed();
                }
            });
        }

        if let Some(slider) =
            by_id("sfxVolume").and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let app = app_rc.clone();
            let input = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let volume = input.value().parse::<f32>().unwrap_or(0.0).clamp(0.0, 100.0) / 100.0;
                let mut app = app.borrow_mut();
                let store = app.store.clone();
                app.audio.set_sfx_volume(&store, volume);
                app.audio.play_click();
            });
            let _ =
                slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(button) = by_id("sfxMuteBtn") {
            let app = app_rc.clone();
            wire_click(&button, move || {
                let mut app = app.borrow_mut();
                let store = app.store.clone();
                let muted = app.audio.toggle_sfx_muted(&store);
                sync_mute_label("sfxMuteBtn", muted);
                if !muted {
                    app.audio.play_click();
                }
            });
        }
    }

    fn set_panel_visible(visible: bool) {
        if let Some(panel) = by_id("settingsPanel") {
            if visible {
                let _ = panel.remove_attribute("hidden");
            } else {
                let _ = panel.set_attribute("hidden", "");
            }
            let _ = panel.set_attribute("aria-hidden", if visible { "false" } else { "true" });
        }
        if let Some(body) = document().and_then(|d| d.body()) {
            if visible {
                let _ = body.class_list().add_1("settings-open");
            } else {
                let _ = body.class_list().remove_1("settings-open");
            }
        }
    }

    fn open_settings_panel(app_rc: &Rc<RefCell<App>>) {
        let should_pause = {
            let mut app = app_rc.borrow_mut();
            let running = app.started && app.state.phase == GamePhase::Playing;
            app.panel.open(!running)
        };
        set_panel_visible(true);
        if should_pause {
            pause_game(app_rc);
        }
    }

    fn close_settings_panel(app_rc: &Rc<RefCell<App>>) {
        let should_resume = {
            let mut app = app_rc.borrow_mut();
            let paused = app.state.phase == GamePhase::Paused;
            app.panel.close(paused)
        };
        set_panel_visible(false);
        if should_resume {
            resume_game(app_rc);
        }
    }

    fn setup_settings_panel(app_rc: &Rc<RefCell<App>>, themes: &Rc<RefCell<ThemeState>>) {
        let Some(button) = by_id("settingsBtn") else {
            return;
        };

        {
            let app = app_rc.clone();
            wire_click(&button, move || {
                let open = app.borrow().panel.is_open();
                if open {
                    close_settings_panel(&app);
                } else {
                    open_settings_panel(&app);
                }
            });
        }

        // Theme buttons inside the panel
        if let Some(panel) = by_id("settingsPanel") {
            if let Ok(buttons) = panel.query_selector_all("[data-theme]") {
                for i in 0..buttons.length() {
                    let Some(theme_button) =
                        buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok())
                    else {
                        continue;
                    };
                    let Some(theme) = theme_button
                        .get_attribute("data-theme")
                        .map(|s| Theme::from_str(&s))
                    else {
                        continue;
                    };
                    let themes = themes.clone();
                    let app = app_rc.clone();
                    wire_click(&theme_button, move || {
                        let store = app.borrow().store.clone();
                        themes.borrow_mut().set(theme, &store);
                    });
                }
            }

            // Escape inside the panel closes it without reaching the
            // document-level pause toggle
            {
                let app = app_rc.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                    if event.key() == "Escape" {
                        event.stop_propagation();
                        close_settings_panel(&app);
                    }
                });
                let _ = panel
                    .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
                closure.forget();
            }

            // Clicking outside the open panel closes it
            if let Some(doc) = document() {
                let app = app_rc.clone();
                let panel_ref = panel.clone();
                let button_ref = button.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                    if !app.borrow().panel.is_open() {
                        return;
                    }
                    let Some(target) = event
                        .target()
                        .and_then(|t| t.dyn_into::<web_sys::Node>().ok())
                    else {
                        return;
                    };
                    if panel_ref.contains(Some(&target)) || button_ref.contains(Some(&target)) {
                        return;
                    }
                    close_settings_panel(&app);
                });
                let _ =
                    doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_touch_controls(app_rc: &Rc<RefCell<App>>) {
        let Some(controls) = by_id("touchControls") else {
            return;
        };
        let Ok(buttons) = controls.query_selector_all("button[data-dir]") else {
            return;
        };
        for i in 0..buttons.length() {
            let Some(button) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let Some(dir) = button.get_attribute("data-dir") else {
                continue;
            };
            let left = dir == "left";

            {
                let app = app_rc.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                    event.prevent_default();
                    let mut app = app.borrow_mut();
                    if left {
                        app.input.left = true;
                    } else {
                        app.input.right = true;
                    }
                });
                let _ = button.add_event_listener_with_callback(
                    "pointerdown",
                    closure.as_ref().unchecked_ref(),
                );
                closure.forget();
            }

            for kind in ["pointerup", "pointercancel", "pointerleave", "pointerout"] {
                let app = app_rc.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                    event.prevent_default();
                    let mut app = app.borrow_mut();
                    if left {
                        app.input.left = false;
                    } else {
                        app.input.right = false;
                    }
                });
                let _ = button
                    .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn typing_into_field() -> bool {
        let Some(active) = document().and_then(|d| d.active_element()) else {
            return false;
        };
        matches!(active.tag_name().as_str(), "INPUT" | "TEXTAREA")
    }

    fn setup_input_handlers(app_rc: &Rc<RefCell<App>>) {
        let Some(doc) = document() else { return };

        {
            let app = app_rc.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                app.borrow().audio.on_user_gesture();
                match event.code().as_str() {
                    "ArrowLeft" | "KeyA" => app.borrow_mut().input.left = true,
                    "ArrowRight" | "KeyD" => app.borrow_mut().input.right = true,
                    "Space" => {
                        if typing_into_field() {
                            return;
                        }
                        event.prevent_default();
                        // With an overlay up, Space presses its button
                        if !ui::overlay_click_primary() {
                            app.borrow_mut().input.jump_held = true;
                        }
                    }
                    "Escape" => toggle_pause(&app),
                    _ => {}
                }
            });
            let _ =
                doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app_rc.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                match event.code().as_str() {
                    "ArrowLeft" | "KeyA" => app.borrow_mut().input.left = false,
                    "ArrowRight" | "KeyD" => app.borrow_mut().input.right = false,
                    "Space" => {
                        if !typing_into_field() {
                            event.prevent_default();
                        }
                        app.borrow_mut().input.jump_held = false;
                    }
                    _ => {}
                }
            });
            let _ = doc.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Tap-to-jump on the canvas
        if let Some(canvas) = by_id("gameCanvas") {
            let app = app_rc.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                event.prevent_default();
                let mut app = app.borrow_mut();
                app.audio.on_user_gesture();
                if app.state.phase == GamePhase::Playing {
                    app.input.jump_tap = true;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

/// Shell entry point: start a new run.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_game() {
    wasm_app::with_app(|app| wasm_app::start_game(app));
}

/// Shell entry point: resume a paused run.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn resume_game() {
    wasm_app::with_app(|app| wasm_app::resume_game(app));
}

/// Shell entry point: toggle pause.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn toggle_pause() {
    wasm_app::with_app(|app| wasm_app::toggle_pause(app));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use tower_jumper::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
    use tower_jumper::highscores::HighScores;
    use tower_jumper::sim::{GamePhase, GameState, Skin, TickInput, tick};
    use tower_jumper::storage::Store;

    env_logger::init();
    log::info!("Tower Jumper (native) - headless demo run");

    let store = Store::new();
    let mut state = GameState::new(Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT), 42, Skin::default());

    // Hold right and hammer jump; see how far the bot climbs.
    let input = TickInput {
        right: true,
        jump_held: true,
        ..Default::default()
    };
    let mut ticks = 0u32;
    while state.phase == GamePhase::Playing && ticks < 100_000 {
        tick(&mut state, &input);
        ticks += 1;
    }

    let ledger = HighScores::record(&store, "bot", state.score, 0.0);
    println!(
        "Run ended after {} ticks with score {} (ledger holds {} entries)",
        ticks,
        state.score,
        ledger.entries.len()
    );
}
