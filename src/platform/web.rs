//! Browser front end
//!
//! One `App` lives in a thread-local; every DOM callback and animation frame
//! borrows it for the duration of the call.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, Element, EventTarget,
    HtmlCanvasElement, KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions, TouchEvent,
};

use crate::audio::WebAudioBackend;
use crate::controller::{GameController, StatusSink};
use crate::input::{ControlInput, Direction, DragGesture};
use crate::renderer::CanvasSurface;
use crate::scheduler::FrameScheduler;
use crate::settings::Settings;

const RESTART_LABEL: &str = "إعادة التشغيل";

/// `requestAnimationFrame` with a cancellable handle
#[derive(Debug, Default)]
struct RafScheduler {
    handle: Option<i32>,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(move |time: f64| on_frame(time));
        match window.request_animation_frame(callback.unchecked_ref()) {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }

    fn cancel_frame(&mut self) {
        if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
            window.cancel_animation_frame(handle).ok();
        }
    }

    fn frame_started(&mut self) {
        self.handle = None;
    }
}

/// Distance readout and end hint elements
struct DomStatus {
    distance: Option<Element>,
    hint: Option<Element>,
}

impl DomStatus {
    fn find(document: &Document) -> Self {
        Self {
            distance: document.get_element_by_id("distance"),
            hint: document.get_element_by_id("hint"),
        }
    }
}

impl StatusSink for DomStatus {
    fn set_distance(&mut self, distance: u32) {
        if let Some(el) = &self.distance {
            el.set_text_content(Some(&distance.to_string()));
        }
    }

    fn set_hint(&mut self, hint: &str) {
        if let Some(el) = &self.hint {
            el.set_text_content(Some(hint));
        }
    }
}

struct App {
    game: GameController<RafScheduler, WebAudioBackend>,
    surface: CanvasSurface,
    status: DomStatus,
    input: ControlInput,
    drag: DragGesture,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| {
        let Ok(mut guard) = cell.try_borrow_mut() else {
            log::debug!("App busy - event dropped");
            return None;
        };
        guard.as_mut().map(f)
    })
}

fn device_pixel_ratio() -> f64 {
    web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
}

fn on_frame(time: f64) {
    with_app(|app| {
        let App {
            game,
            surface,
            status,
            input,
            ..
        } = app;
        game.frame(time, input, surface, status);
    });
}

/// Read the optional `<script id="game-settings">` JSON block
fn load_settings(document: &Document) -> Settings {
    let Some(json) = document
        .get_element_by_id("game-settings")
        .and_then(|el| el.text_content())
    else {
        return Settings::default();
    };
    match Settings::from_json(&json) {
        Ok(settings) => {
            log::info!("Loaded game settings from page");
            settings
        }
        Err(e) => {
            log::warn!("Ignoring page settings, using defaults: {}", e);
            Settings::default()
        }
    }
}

fn listen(target: &EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::warn!("Failed to attach {} listener: {:?}", event, e);
    }
    closure.forget();
}

/// Non-passive listener so `prevent_default` can stop page scrolling
fn listen_active(target: &EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &options,
    ) {
        log::warn!("Failed to attach {} listener: {:?}", event, e);
    }
    closure.forget();
}

fn first_touch(event: &web_sys::Event) -> Option<(f32, f32)> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some((touch.client_x() as f32, touch.client_y() as f32))
}

fn setup_keyboard() {
    let Some(window) = web_sys::window() else {
        return;
    };
    for (event, pressed) in [("keydown", true), ("keyup", false)] {
        listen(&window, event, move |event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                with_app(|app| app.input.apply_key(&key.key(), pressed));
            }
        });
    }
    // Key-ups are never delivered once focus leaves the page
    listen(&window, "blur", |_| {
        with_app(|app| app.drag.end(&mut app.input));
    });
}

fn setup_touch(canvas: &HtmlCanvasElement) {
    listen_active(canvas, "touchstart", |event| {
        event.prevent_default();
        if let Some((x, y)) = first_touch(&event) {
            with_app(|app| app.drag.begin(x, y));
        }
    });
    listen_active(canvas, "touchmove", |event| {
        if let Some((x, y)) = first_touch(&event) {
            with_app(|app| app.drag.update(x, y, &mut app.input));
        }
    });
    for event in ["touchend", "touchcancel"] {
        listen(canvas, event, |_| {
            with_app(|app| app.drag.end(&mut app.input));
        });
    }
}

fn setup_direction_buttons(document: &Document) {
    let buttons = [
        ("up", Direction::Up),
        ("down", Direction::Down),
        ("left", Direction::Left),
        ("right", Direction::Right),
    ];
    for (id, dir) in buttons {
        let Some(btn) = document.get_element_by_id(id) else {
            continue;
        };
        listen(&btn, "touchstart", move |_| {
            with_app(|app| app.input.set(dir, true));
        });
        for event in ["touchend", "touchcancel"] {
            listen(&btn, event, move |_| {
                with_app(|app| app.input.set(dir, false));
            });
        }
    }
}

fn setup_controls(document: &Document) {
    if let Some(play) = document.get_element_by_id("playBtn") {
        let label = play.clone();
        listen(&play, "click", move |_| {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(wrap) = document.get_element_by_id("gameWrap") {
                wrap.class_list().remove_1("hidden").ok();
            }
            start_game();
            label.set_text_content(Some(RESTART_LABEL));
            if let Some(main) = document.get_element_by_id("main") {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                main.scroll_into_view_with_scroll_into_view_options(&options);
            }
        });
    }

    if let Some(toggle) = document.get_element_by_id("soundToggle") {
        let pressed = toggle.clone();
        listen(&toggle, "click", move |_| {
            let enabled = toggle_audio();
            pressed
                .set_attribute("aria-pressed", if enabled { "true" } else { "false" })
                .ok();
        });
    }

    if let Some(window) = web_sys::window() {
        listen(&window, "resize", |_| {
            with_app(|app| {
                let viewport = app.surface.fit_to_layout(device_pixel_ratio());
                app.game.resize(viewport, &mut app.surface);
            });
        });
    }
}

/// Start (or restart) a session with a time-derived seed
#[wasm_bindgen]
pub fn start_game() {
    with_app(|app| {
        app.input.release_all();
        app.drag = DragGesture::default();
        app.game.start(js_sys::Date::now() as u64);
        let viewport = app.surface.fit_to_layout(device_pixel_ratio());
        app.game.resize(viewport, &mut app.surface);
    });
}

/// Silence the ambient bed; the session keeps running
#[wasm_bindgen]
pub fn stop_ambient() {
    with_app(|app| app.game.stop_ambient());
}

/// Flip sound on/off; returns the new state
#[wasm_bindgen]
pub fn toggle_audio() -> bool {
    with_app(|app| app.game.toggle_audio()).unwrap_or(false)
}

/// Page bootstrap: logging, canvas, listeners and the title-screen preview
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

    log::info!("Lantern Double starting...");

    let window = web_sys::window().expect("no window");
    let document = window.document().expect("no document");

    let canvas: HtmlCanvasElement = document
        .get_element_by_id("game")
        .ok_or("no #game canvas")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("#game is not a canvas"))?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or("no 2d context")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("unexpected 2d context type"))?;

    let settings = load_settings(&document);
    let mut surface = CanvasSurface::new(canvas.clone(), ctx);
    let viewport = surface.fit_to_layout(window.device_pixel_ratio());
    let entropy = js_sys::Date::now() as u64;

    let mut game = GameController::new(
        settings,
        RafScheduler::default(),
        WebAudioBackend,
        viewport,
        entropy,
    );
    game.preview(entropy, &mut surface);

    APP.with(|cell| {
        *cell.borrow_mut() = Some(App {
            game,
            surface,
            status: DomStatus::find(&document),
            input: ControlInput::default(),
            drag: DragGesture::default(),
        });
    });

    setup_keyboard();
    setup_touch(&canvas);
    setup_direction_buttons(&document);
    setup_controls(&document);

    log::info!("Lantern Double ready (seed {})", entropy);
    Ok(())
}
