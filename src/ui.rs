//! DOM glue
//!
//! The shell document defines the controls; everything here looks elements
//! up by id and silently skips whatever is missing. No game logic lives in
//! handlers - they persist customization state and hand skins to the app.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlAnchorElement, HtmlCanvasElement,
    HtmlElement, HtmlInputElement, HtmlSelectElement, PointerEvent,
};

use crate::highscores::HighScores;
use crate::pixel::{
    COLOR_CHOICES, EDITOR_PALETTE, PIXEL_GRID, PIXEL_SLOTS, PixelArt, PixelStore, RenderMode,
    Stroke,
};
use crate::settings::Theme;
use crate::sim::Skin;
use crate::storage::Store;

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

fn input_by_id(id: &str) -> Option<HtmlInputElement> {
    by_id(id)?.dyn_into().ok()
}

fn select_by_id(id: &str) -> Option<HtmlSelectElement> {
    by_id(id)?.dyn_into().ok()
}

fn canvas_by_id(id: &str) -> Option<HtmlCanvasElement> {
    by_id(id)?.dyn_into().ok()
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn set_display(element: &Element, value: &str) {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property("display", value);
    }
}

// === Overlay ===

/// Fill the overlay with a title/subtitle/button and show it. Returns the
/// button so the caller can wire its action.
pub fn overlay_show(title: &str, subtitle: &str, button_label: &str) -> Option<Element> {
    let document = document()?;
    let overlay = document.get_element_by_id("overlay")?;
    overlay.set_inner_html("");

    let heading = document.create_element("h1").ok()?;
    heading.set_text_content(Some(title));
    overlay.append_child(&heading).ok()?;

    if !subtitle.is_empty() {
        if let Ok(paragraph) = document.create_element("p") {
            paragraph.set_text_content(Some(subtitle));
            let _ = overlay.append_child(&paragraph);
        }
    }

    let button = document.create_element("button").ok()?;
    button.set_text_content(Some(button_label));
    overlay.append_child(&button).ok()?;

    set_display(&overlay, "flex");
    Some(button)
}

pub fn overlay_hide() {
    if let Some(overlay) = by_id("overlay") {
        set_display(&overlay, "none");
    }
}

pub fn overlay_visible() -> bool {
    by_id("overlay")
        .and_then(|overlay| {
            let html = overlay.dyn_into::<HtmlElement>().ok()?;
            Some(html.style().get_property_value("display").ok()? != "none")
        })
        .unwrap_or(false)
}

/// Activate the overlay's button (Space shortcut). Returns whether one fired.
pub fn overlay_click_primary() -> bool {
    if !overlay_visible() {
        return false;
    }
    let button = by_id("overlay")
        .and_then(|overlay| overlay.query_selector("button").ok().flatten())
        .and_then(|b| b.dyn_into::<HtmlElement>().ok());
    match button {
        Some(button) => {
            button.click();
            true
        }
        None => false,
    }
}

// === High scores ===

pub fn update_high_scores(ledger: &HighScores) {
    let Some(document) = document() else { return };
    let Some(tbody) = document
        .query_selector("#highScoresTable tbody")
        .ok()
        .flatten()
    else {
        return;
    };
    tbody.set_inner_html("");
    for entry in &ledger.entries {
        let Ok(row) = document.create_element("tr") else {
            continue;
        };
        if let Ok(name) = document.create_element("td") {
            name.set_text_content(Some(&entry.name));
            let _ = row.append_child(&name);
        }
        if let Ok(score) = document.create_element("td") {
            score.set_text_content(Some(&entry.score.to_string()));
            let _ = row.append_child(&score);
        }
        let _ = tbody.append_child(&row);
    }
}

// === Theme ===

pub fn apply_body_theme(theme: Theme) {
    let Some(body) = document().and_then(|d| d.body()) else {
        return;
    };
    for candidate in Theme::ALL {
        let _ = body.class_list().remove_1(candidate.body_class());
    }
    let _ = body.class_list().add_1(theme.body_class());
}

/// Highlight the active theme button inside the settings panel.
pub fn mark_theme_buttons(theme: Theme) {
    let Some(panel) = by_id("settingsPanel") else {
        return;
    };
    let Ok(buttons) = panel.query_selector_all("[data-theme]") else {
        return;
    };
    for i in 0..buttons.length() {
        let Some(button) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let active = button.get_attribute("data-theme").as_deref() == Some(theme.as_str());
        if active {
            let _ = button.class_list().add_1("active");
        } else {
            let _ = button.class_list().remove_1("active");
        }
        let _ = button.set_attribute("aria-pressed", if active { "true" } else { "false" });
    }
}

// === Customization (color picker, design picker, pixel modal) ===

struct EditorState {
    art: PixelArt,
    stroke: Option<Stroke>,
}

type ApplySkin = Rc<dyn Fn(Skin)>;

/// Wire the whole customization surface. Call once at startup.
pub fn wire_customization(store: Rc<Store>, apply_skin: ApplySkin) {
    let editor = Rc::new(RefCell::new(EditorState {
        art: PixelStore::new(&store).load_active(),
        stroke: None,
    }));
    render_color_picker(&store, &apply_skin, &editor);
    wire_pixel_modal(&store, &apply_skin, &editor);
}

fn modal_set_visible(visible: bool) {
    if let Some(modal) = by_id("pixelModal") {
        set_display(&modal, if visible { "flex" } else { "none" });
    }
}

fn modal_open() -> bool {
    by_id("pixelModal")
        .and_then(|modal| {
            let html = modal.dyn_into::<HtmlElement>().ok()?;
            Some(html.style().get_property_value("display").ok()? == "flex")
        })
        .unwrap_or(false)
}

fn open_pixel_modal(store: &Rc<Store>, editor: &Rc<RefCell<EditorState>>) {
    editor.borrow_mut().art = PixelStore::new(store).load_active();
    draw_editor(&editor.borrow().art);
    modal_set_visible(true);
}

/// Render the solid-color swatches plus the pixel-mode button.
fn render_color_picker(store: &Rc<Store>, apply_skin: &ApplySkin, editor: &Rc<RefCell<EditorState>>) {
    let Some(document) = document() else { return };
    let Some(picker) = document.get_element_by_id("colorPicker") else {
        return;
    };
    picker.set_inner_html("");

    let pixels = PixelStore::new(store);
    let mode = pixels.render_mode();
    let current = pixels.color();

    for color in COLOR_CHOICES {
        let Ok(swatch) = document.create_element("button") else {
            continue;
        };
        let selected = mode == RenderMode::Color && color == current;
        swatch.set_class_name(if selected {
            "swatch color-cell selected"
        } else {
            "swatch color-cell"
        });
        let _ = swatch.set_attribute("type", "button");
        let _ = swatch.set_attribute("title", color);
        if let Some(html) = swatch.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property("background", color);
        }
        {
            let store = store.clone();
            let apply_skin = apply_skin.clone();
            let editor = editor.clone();
            let color = color.to_string();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let pixels = PixelStore::new(&store);
                pixels.set_render_mode(RenderMode::Color);
                pixels.set_color(&color);
                apply_skin(Skin::Color(color.clone()));
                render_color_picker(&store, &apply_skin, &editor);
            });
            let _ = swatch
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        let _ = picker.append_child(&swatch);
    }

    if let Ok(pixel_button) = document.create_element("button") {
        pixel_button.set_class_name(if mode == RenderMode::Pixel {
            "swatch pixel color-cell selected"
        } else {
            "swatch pixel color-cell"
        });
        let _ = pixel_button.set_attribute("type", "button");
        pixel_button.set_text_content(Some("PX"));
        {
            let store = store.clone();
            let apply_skin = apply_skin.clone();
            let editor = editor.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let pixels = PixelStore::new(&store);
                pixels.set_render_mode(RenderMode::Pixel);
                apply_skin(Skin::Pixel(pixels.load_active()));
                open_pixel_modal(&store, &editor);
                render_color_picker(&store, &apply_skin, &editor);
            });
            let _ = pixel_button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        let _ = picker.append_child(&pixel_button);
    }

    render_design_picker(store, apply_skin, editor);
}

/// One preview button per slot, thumbnailed onto a small canvas.
fn render_design_picker(store: &Rc<Store>, apply_skin: &ApplySkin, editor: &Rc<RefCell<EditorState>>) {
    let Some(document) = document() else { return };
    let Some(holder) = document.get_element_by_id("designPicker") else {
        return;
    };
    holder.set_inner_html("");
    let pixels = PixelStore::new(store);

    for slot in 0..PIXEL_SLOTS {
        let art = pixels.load_slot(slot);
        let Ok(button) = document.create_element("button") else {
            continue;
        };
        button.set_class_name("design");
        let _ = button.set_attribute("title", &format!("Design {}", slot + 1));

        if let Ok(mini) = document.create_element("canvas") {
            if let Ok(mini) = mini.dyn_into::<HtmlCanvasElement>() {
                mini.set_width(48);
                mini.set_height(48);
                if let Some(ctx) = context_2d(&mini) {
                    let scale = 48.0 / PIXEL_GRID as f64;
                    let _ = ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);
                    ctx.clear_rect(0.0, 0.0, PIXEL_GRID as f64, PIXEL_GRID as f64);
                    blit_cells(&ctx, &art);
                }
                let _ = button.append_child(&mini);
            }
        }

        {
            let store = store.clone();
            let apply_skin = apply_skin.clone();
            let editor = editor.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let pixels = PixelStore::new(&store);
                pixels.set_render_mode(RenderMode::Pixel);
                pixels.set_slot(slot);
                let art = pixels.load_slot(slot);
                editor.borrow_mut().art = art.clone();
                apply_skin(Skin::Pixel(art));
                render_color_picker(&store, &apply_skin, &editor);
            });
            let _ = button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        let _ = holder.append_child(&button);
    }
}

fn blit_cells(ctx: &CanvasRenderingContext2d, art: &PixelArt) {
    for y in 0..PIXEL_GRID {
        for x in 0..PIXEL_GRID {
            if let Some(color) = art.get(x as i32, y as i32).color() {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(x as f64, y as f64, 1.0, 1.0);
            }
        }
    }
}

/// Repaint the editor canvas and the live preview.
fn draw_editor(art: &PixelArt) {
    if let Some(canvas) = canvas_by_id("pixelEditor") {
        if let Some(ctx) = context_2d(&canvas) {
            let width = canvas.width() as f64;
            let height = canvas.height() as f64;
            let cell_w = (width / PIXEL_GRID as f64).floor();
            let cell_h = (height / PIXEL_GRID as f64).floor();
            ctx.clear_rect(0.0, 0.0, width, height);
            for y in 0..PIXEL_GRID {
                for x in 0..PIXEL_GRID {
                    if let Some(color) = art.get(x as i32, y as i32).color() {
                        ctx.set_fill_style_str(color);
                        ctx.fill_rect(x as f64 * cell_w, y as f64 * cell_h, cell_w, cell_h);
                    }
                }
            }
            ctx.set_stroke_style_str("rgba(255,255,255,0.2)");
            ctx.set_line_width(1.0);
            for i in 0..=PIXEL_GRID {
                ctx.begin_path();
                ctx.move_to(i as f64 * cell_w, 0.0);
                ctx.line_to(i as f64 * cell_w, PIXEL_GRID as f64 * cell_h);
                ctx.stroke();
                ctx.begin_path();
                ctx.move_to(0.0, i as f64 * cell_h);
                ctx.line_to(PIXEL_GRID as f64 * cell_w, i as f64 * cell_h);
                ctx.stroke();
            }
        }
    }

    if let Some(preview) = canvas_by_id("pixelPreview") {
        if let Some(ctx) = context_2d(&preview) {
            let scale_x = preview.width() as f64 / PIXEL_GRID as f64;
            let scale_y = preview.height() as f64 / PIXEL_GRID as f64;
            let _ = ctx.set_transform(scale_x, 0.0, 0.0, scale_y, 0.0, 0.0);
            ctx.clear_rect(0.0, 0.0, PIXEL_GRID as f64, PIXEL_GRID as f64);
            blit_cells(&ctx, art);
        }
    }
}

fn render_editor_palette(store: &Rc<Store>) {
    let Some(document) = document() else { return };
    let Some(holder) = document.get_element_by_id("editorPalette") else {
        return;
    };
    holder.set_inner_html("");
    let current = PixelStore::new(store).brush_color().to_lowercase();

    for color in EDITOR_PALETTE {
        let Ok(swatch) = document.create_element("button") else {
            continue;
        };
        let selected = color.to_lowercase() == current;
        swatch.set_class_name(if selected { "swatch selected" } else { "swatch" });
        let _ = swatch.set_attribute("type", "button");
        let _ = swatch.set_attribute("title", color);
        if let Some(html) = swatch.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property("background", color);
        }
        {
            let store = store.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                PixelStore::new(&store).set_brush_color(color);
                render_editor_palette(&store);
            });
            let _ = swatch
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        let _ = holder.append_child(&swatch);
    }
}

/// Map pointer coordinates to an editor cell.
fn pointer_to_cell(canvas: &HtmlCanvasElement, event: &PointerEvent) -> (i32, i32) {
    let rect = canvas.get_bounding_client_rect();
    let x = ((event.client_x() as f64 - rect.left()) / rect.width() * PIXEL_GRID as f64).floor();
    let y = ((event.client_y() as f64 - rect.top()) / rect.height() * PIXEL_GRID as f64).floor();
    (x as i32, y as i32)
}

fn update_coord_label(x: i32, y: i32) {
    if x < 0 || y < 0 || x >= PIXEL_GRID as i32 || y >= PIXEL_GRID as i32 {
        return;
    }
    if let Some(label) = by_id("coord") {
        label.set_text_content(Some(&format!("{x:03},{y:03}")));
    }
}

fn wire_pixel_modal(store: &Rc<Store>, apply_skin: &ApplySkin, editor: &Rc<RefCell<EditorState>>) {
    let Some(canvas) = canvas_by_id("pixelEditor") else {
        return;
    };

    render_editor_palette(store);
    draw_editor(&editor.borrow().art);

    // Brush size slider
    if let Some(size_input) = input_by_id("brushSize") {
        let pixels = PixelStore::new(store);
        size_input.set_value(&pixels.brush_size().to_string());
        if let Some(label) = by_id("brushSizeVal") {
            label.set_text_content(Some(&size_input.value()));
        }
        let store = store.clone();
        let input = size_input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let size = input.value().parse::<i32>().unwrap_or(1).clamp(1, 5);
            PixelStore::new(&store).set_brush_size(size as u8);
            if let Some(label) = by_id("brushSizeVal") {
                label.set_text_content(Some(&size.to_string()));
            }
        });
        let _ =
            size_input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Brush shape select
    if let Some(shape_select) = select_by_id("brushShape") {
        shape_select.set_value(PixelStore::new(store).brush_shape().as_str());
        let store = store.clone();
        let select = shape_select.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let shape = crate::pixel::BrushShape::from_str(&select.value());
            PixelStore::new(&store).set_brush_shape(shape);
        });
        let _ = shape_select
            .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Slot select
    if let Some(slot_select) = select_by_id("pixelArtSlot") {
        slot_select.set_value(&PixelStore::new(store).slot().to_string());
        let store = store.clone();
        let apply_skin = apply_skin.clone();
        let editor = editor.clone();
        let select = slot_select.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let pixels = PixelStore::new(&store);
            let slot = pixels.set_slot(select.value().parse().unwrap_or(0));
            let art = pixels.load_slot(slot);
            editor.borrow_mut().art = art.clone();
            draw_editor(&art);
            apply_skin(Skin::Pixel(art));
        });
        let _ = slot_select
            .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Save / clear / reset / close buttons
    if let Some(button) = by_id("pixelSave") {
        let store = store.clone();
        let apply_skin = apply_skin.clone();
        let editor = editor.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            PixelStore::new(&store).save_active(&editor.borrow().art);
            render_design_picker(&store, &apply_skin, &editor);
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    if let Some(button) = by_id("pixelClear") {
        let store = store.clone();
        let apply_skin = apply_skin.clone();
        let editor = editor.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let pixels = PixelStore::new(&store);
            let art = pixels.clear_slot(pixels.slot());
            editor.borrow_mut().art = art.clone();
            draw_editor(&art);
            apply_skin(Skin::Pixel(art));
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    if let Some(button) = by_id("pixelReset") {
        let store = store.clone();
        let apply_skin = apply_skin.clone();
        let editor = editor.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let art = PixelStore::new(&store).default_art();
            PixelStore::new(&store).save_active(&art);
            editor.borrow_mut().art = art.clone();
            draw_editor(&art);
            apply_skin(Skin::Pixel(art));
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    if let Some(button) = by_id("pixelClose") {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            modal_set_visible(false);
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Export the active slot as a JSON download
    if let Some(button) = by_id("pixelExport") {
        let store = store.clone();
        let editor = editor.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let pixels = PixelStore::new(&store);
            let slot = pixels.slot();
            if let Some(json) = pixels.export(slot, &editor.borrow().art) {
                download_json(&json, &format!("towerjumper_pixel_slot-{slot}.json"));
            }
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Import a JSON file into the active slot
    if let (Some(button), Some(file_input)) = (by_id("pixelImport"), input_by_id("pixelFile")) {
        {
            let file_input = file_input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                file_input.click();
            });
            let _ =
                button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let store = store.clone();
        let apply_skin = apply_skin.clone();
        let editor = editor.clone();
        let input = file_input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            let store = store.clone();
            let apply_skin = apply_skin.clone();
            let editor = editor.clone();
            let input = input.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let text = wasm_bindgen_futures::JsFuture::from(file.text())
                    .await
                    .ok()
                    .and_then(|value| value.as_string());
                if let Some(text) = text {
                    match PixelStore::new(&store).import_active(&text) {
                        Ok(art) => {
                            editor.borrow_mut().art = art.clone();
                            draw_editor(&art);
                            render_design_picker(&store, &apply_skin, &editor);
                            apply_skin(Skin::Pixel(art));
                        }
                        Err(err) => {
                            log::warn!("Pixel-art import rejected: {err}");
                            alert(&format!("Import failed: {err}."));
                        }
                    }
                }
                input.set_value("");
            });
        });
        let _ =
            file_input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Painting. The stroke's paint/erase decision is made on pointer-down.
    {
        let store = store.clone();
        let apply_skin = apply_skin.clone();
        let editor = editor.clone();
        let canvas_ref = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            event.prevent_default();
            let (x, y) = pointer_to_cell(&canvas_ref, &event);
            let pixels = PixelStore::new(&store);
            let brush = pixels.brush();
            let mut state = editor.borrow_mut();
            let stroke = Stroke::begin(&state.art, x, y, &brush);
            let changed = stroke.apply(&mut state.art, x, y, &brush);
            state.stroke = Some(stroke);
            if changed {
                pixels.save_active(&state.art);
                draw_editor(&state.art);
                apply_skin(Skin::Pixel(state.art.clone()));
            }
            update_coord_label(x, y);
        });
        let _ = canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    if let Some(window) = web_sys::window() {
        {
            let store = store.clone();
            let apply_skin = apply_skin.clone();
            let editor = editor.clone();
            let canvas_ref = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let (x, y) = pointer_to_cell(&canvas_ref, &event);
                update_coord_label(x, y);
                let pixels = PixelStore::new(&store);
                let brush = pixels.brush();
                let mut state = editor.borrow_mut();
                let Some(stroke) = state.stroke.clone() else {
                    return;
                };
                if stroke.apply(&mut state.art, x, y, &brush) {
                    pixels.save_active(&state.art);
                    draw_editor(&state.art);
                    apply_skin(Skin::Pixel(state.art.clone()));
                }
            });
            let _ = window
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for kind in ["pointerup", "pointercancel"] {
            let editor = editor.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                editor.borrow_mut().stroke = None;
            });
            let _ =
                window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    // Escape closes the modal (the document handler may also toggle pause,
    // matching the shipped behavior)
    if let Some(doc) = document() {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            if event.key() == "Escape" && modal_open() {
                modal_set_visible(false);
            }
        });
        let _ = doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Click outside the dialog closes the modal
    if let Some(modal) = by_id("pixelModal") {
        let modal_ref = modal.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
            if let Some(target) = event.target() {
                if let Some(element) = target.dyn_ref::<Element>() {
                    if element == &modal_ref {
                        modal_set_visible(false);
                    }
                }
            }
        });
        let _ = modal.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn download_json(json: &str, filename: &str) {
    let Some(document) = document() else { return };
    let parts = js_sys::Array::of1(&JsValue::from_str(json));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let Ok(blob) = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options) else {
        return;
    };
    let Ok(url) = web_sys::Url::create_object_url_with_blob(&blob) else {
        return;
    };
    if let Ok(anchor) = document.create_element("a") {
        if let Ok(anchor) = anchor.dyn_into::<HtmlAnchorElement>() {
            anchor.set_href(&url);
            anchor.set_download(filename);
            if let Some(body) = document.body() {
                let _ = body.append_child(&anchor);
                anchor.click();
                anchor.remove();
            }
        }
    }
    let _ = web_sys::Url::revoke_object_url(&url);
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}
