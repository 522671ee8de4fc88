use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    CanvasRenderingContext2d, Document, Event, HtmlButtonElement, HtmlCanvasElement,
    HtmlDivElement, HtmlElement, HtmlImageElement, KeyboardEvent, Window,
};

pub mod game;
pub mod input;
pub mod render;
pub mod storage;
pub mod viewport;

use game::{Game, GameConfig, StepOutcome};
use input::{InputEvent, classify_event_type, classify_key, input_name};
use render::Sprites;
use viewport::Viewport;

/// Switches read from the page URL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub diagnostics: bool,
    pub persist_high_score: bool,
}

impl RuntimeOptions {
    /// `diag=1` opens the diagnostics panel, `nostore=1` keeps the high
    /// score in memory only.
    pub fn from_query(search: &str) -> Self {
        let mut options = Self {
            diagnostics: false,
            persist_high_score: true,
        };

        for pair in search.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let on = value == "1";
            match key {
                "diag" => options.diagnostics = on,
                "nostore" => options.persist_high_score = !on,
                _ => {}
            }
        }

        options
    }
}

struct AppState {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    play_again: HtmlButtonElement,
    document: Document,
    diagnostics: Option<HtmlDivElement>,
    diagnostics_text: Option<HtmlElement>,
    options: RuntimeOptions,
    game: Game,
    sprites: Sprites,
    viewport: Viewport,
    frame_pending: bool,
    overlay_shown: bool,
    frame_count: u64,
    spawn_ticks: u64,
    sprites_loaded: u32,
    last_event: String,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn window() -> Window {
    web_sys::window().expect("missing window")
}

pub(crate) fn js_value_to_string(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

fn set_status(document: &Document, status: &str) {
    if let Some(el) = document.document_element() {
        let _ = el.set_attribute("data-game-status", status);
    }
}

fn set_play_again_visible(state: &mut AppState, visible: bool) {
    state.overlay_shown = visible;
    let _ = state
        .play_again
        .style()
        .set_property("display", if visible { "block" } else { "none" });
}

fn set_diagnostics_open(state: &AppState, open: bool) {
    if let Some(el) = state.document.document_element() {
        let _ = el.set_attribute("data-diag-open", if open { "1" } else { "0" });
    }
    if let Some(panel) = &state.diagnostics {
        if open {
            let _ = panel.remove_attribute("hidden");
        } else {
            let _ = panel.set_attribute("hidden", "");
        }
        let _ = panel.set_attribute("aria-hidden", if open { "false" } else { "true" });
    }
}

fn update_diagnostics(state: &AppState) {
    if !state.options.diagnostics {
        return;
    }
    let Some(text) = &state.diagnostics_text else {
        return;
    };

    let status = state
        .document
        .document_element()
        .and_then(|el| el.get_attribute("data-game-status"))
        .unwrap_or_else(|| "unknown".to_string());
    let game = &state.game;

    let lines = [
        format!("status: {}", status),
        format!("event: {}", state.last_event),
        format!("score: {} (best {})", game.score, game.high_score),
        format!("game_over: {}", game.game_over),
        format!("bird: y {:.1} vy {:.2}", game.bird.y, game.velocity_y),
        format!("pipes: {}", game.pipes.len()),
        format!("frames: {}", state.frame_count),
        format!("spawn_ticks: {}", state.spawn_ticks),
        format!("sprites: {}/3", state.sprites_loaded),
        format!(
            "surface: {}x{} @ scale {:.3}",
            state.canvas.width(),
            state.canvas.height(),
            state.viewport.scale
        ),
        format!("persist: {}", state.options.persist_high_score),
    ];

    text.set_text_content(Some(&lines.join("\n")));
}

fn fit_viewport(state: &mut AppState) -> Result<(), JsValue> {
    let window = window();
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    let config = *state.game.config();

    state.viewport = Viewport::fit(width, height, config.board_width, config.board_height);
    viewport::apply(&state.canvas, &state.context, &state.viewport)
}

fn persist_high_score(state: &AppState) {
    if !state.options.persist_high_score {
        return;
    }
    if let Err(err) = storage::save_high_score(state.game.high_score) {
        warn(&format!("high score not saved: {}", err));
    }
}

/// Runs one frame. Returns whether another frame should be scheduled.
fn run_frame(state: &mut AppState) -> bool {
    state.frame_count += 1;

    match state.game.step() {
        StepOutcome::Advanced => {
            if state.overlay_shown {
                set_play_again_visible(state, false);
                set_status(&state.document, "running");
                state.last_event = "restart".to_string();
                log("restart");
            }
            render::draw_frame(&state.context, &state.game, &state.sprites);
            true
        }
        StepOutcome::Ended { new_high_score } => {
            render::draw_frame(&state.context, &state.game, &state.sprites);
            if new_high_score {
                persist_high_score(state);
            }
            state.last_event = "game_over".to_string();
            log(&format!(
                "game over: score {} (high score {}{})",
                state.game.score,
                state.game.high_score,
                if new_high_score { ", new" } else { "" }
            ));
            true
        }
        StepOutcome::Halted => {
            render::draw_game_over(&state.context, &state.game);
            set_play_again_visible(state, true);
            set_status(&state.document, "game_over");
            false
        }
    }
}

fn request_frame(state: &Rc<RefCell<AppState>>, frame_cb: &FrameCallback) {
    let mut st = state.borrow_mut();
    if st.frame_pending {
        return;
    }

    let callback = frame_cb.borrow();
    let Some(cb) = callback.as_ref() else {
        return;
    };
    if window()
        .request_animation_frame(cb.as_ref().unchecked_ref())
        .is_ok()
    {
        st.frame_pending = true;
    }
}

fn queue_input(state: &Rc<RefCell<AppState>>, frame_cb: &FrameCallback, input: InputEvent) {
    {
        let mut st = state.borrow_mut();
        st.game.queue_input(input);
        st.last_event = input_name(input).to_string();
    }

    // A halted loop only wakes up for a restart.
    if input == InputEvent::Restart {
        request_frame(state, frame_cb);
    }
}

async fn load_sprite(image: HtmlImageElement, url: &str) -> Result<(), JsValue> {
    image.set_src(url);
    JsFuture::from(image.decode()).await?;
    Ok(())
}

fn spawn_sprite_load(state: &Rc<RefCell<AppState>>, image: HtmlImageElement, url: &'static str) {
    let state = Rc::clone(state);
    spawn_local(async move {
        let result = load_sprite(image, url).await;

        let mut st = state.borrow_mut();
        match result {
            Ok(()) => {
                st.sprites_loaded += 1;
                st.last_event = format!("sprite_loaded ({})", url);
            }
            Err(err) => {
                warn(&format!("failed to load {}: {}", url, js_value_to_string(&err)));
                st.last_event = format!("sprite_error ({})", url);
            }
        }
        update_diagnostics(&st);
    });
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if let Err(err) = start_impl() {
        let message = format!("fatal: {}", js_value_to_string(&err));

        if let Some(win) = web_sys::window() {
            if let Some(doc) = win.document() {
                set_status(&doc, "error");
                if let Some(diag) = doc.get_element_by_id("diagnostics-text") {
                    diag.set_text_content(Some(&message));
                }
            }
        }

        web_sys::console::error_1(&err);
    }
}

fn start_impl() -> Result<(), JsValue> {
    let win = window();
    let document = win
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas = document
        .get_element_by_id("board")
        .ok_or_else(|| JsValue::from_str("Missing board canvas"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let context = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let play_again = document
        .get_element_by_id("playAgainButton")
        .ok_or_else(|| JsValue::from_str("Missing play again button"))?
        .dyn_into::<HtmlButtonElement>()?;

    let diagnostics = document
        .get_element_by_id("diagnostics")
        .and_then(|el| el.dyn_into::<HtmlDivElement>().ok());
    let diagnostics_text = document
        .get_element_by_id("diagnostics-text")
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());

    let search = win.location().search().unwrap_or_default();
    let mut options = RuntimeOptions::from_query(&search);
    let user_agent = win.navigator().user_agent().unwrap_or_default();
    if user_agent.to_ascii_lowercase().contains("headless") {
        options.diagnostics = true;
    }

    let high_score = if options.persist_high_score {
        storage::load_high_score().unwrap_or_else(|err| {
            warn(&format!("high score unavailable: {}", err));
            0
        })
    } else {
        0
    };

    let config = GameConfig::default();
    let spawn_interval_ms = config.spawn_interval_ms;

    let state = Rc::new(RefCell::new(AppState {
        canvas,
        context,
        play_again,
        document: document.clone(),
        diagnostics,
        diagnostics_text,
        options,
        game: Game::new(config, high_score),
        sprites: Sprites::new()?,
        viewport: Viewport::fit(
            config.board_width,
            config.board_height,
            config.board_width,
            config.board_height,
        ),
        frame_pending: false,
        overlay_shown: false,
        frame_count: 0,
        spawn_ticks: 0,
        sprites_loaded: 0,
        last_event: "init".to_string(),
    }));

    {
        let mut st = state.borrow_mut();
        fit_viewport(&mut st)?;
        set_play_again_visible(&mut st, false);
        set_diagnostics_open(&st, st.options.diagnostics);
        set_status(&document, "loading");
        update_diagnostics(&st);
    }
    log(&format!("starting (high score {})", high_score));

    {
        let st = state.borrow();
        spawn_sprite_load(&state, st.sprites.bird.clone(), render::BIRD_IMAGE_URL);
        spawn_sprite_load(&state, st.sprites.pipe_top.clone(), render::PIPE_TOP_IMAGE_URL);
        spawn_sprite_load(
            &state,
            st.sprites.pipe_bottom.clone(),
            render::PIPE_BOTTOM_IMAGE_URL,
        );
    }

    // The frame closure reschedules itself through this holder for as long
    // as the page lives.
    let frame_cb: FrameCallback = Rc::new(RefCell::new(None));
    {
        let state_frame = Rc::clone(&state);
        let frame_cb_inner = Rc::clone(&frame_cb);
        *frame_cb.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
            let keep_running = {
                let mut st = state_frame.borrow_mut();
                st.frame_pending = false;
                let keep_running = run_frame(&mut st);
                update_diagnostics(&st);
                keep_running
            };

            if keep_running {
                request_frame(&state_frame, &frame_cb_inner);
            }
        }) as Box<dyn FnMut(f64)>));
    }

    let state_spawn = Rc::clone(&state);
    let spawn = Closure::wrap(Box::new(move || {
        let mut st = state_spawn.borrow_mut();
        st.spawn_ticks += 1;
        if st.game.spawn_pipes(js_sys::Math::random()) {
            st.last_event = "spawn".to_string();
        }
    }) as Box<dyn FnMut()>);

    // Never cleared: game over only gates what the tick does.
    win.set_interval_with_callback_and_timeout_and_arguments_0(
        spawn.as_ref().unchecked_ref(),
        spawn_interval_ms,
    )?;
    spawn.forget();

    let state_key = Rc::clone(&state);
    let frame_cb_key = Rc::clone(&frame_cb);
    let on_keydown = Closure::wrap(Box::new(move |event: Event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if let Some(input) = classify_key(&key.code()) {
            queue_input(&state_key, &frame_cb_key, input);
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;
    on_keydown.forget();

    let state_pointer = Rc::clone(&state);
    let frame_cb_pointer = Rc::clone(&frame_cb);
    let on_pointer = Closure::wrap(Box::new(move |event: Event| {
        if let Some(input) = classify_event_type(&event.type_()) {
            queue_input(&state_pointer, &frame_cb_pointer, input);
        }
    }) as Box<dyn FnMut(_)>);
    for event_type in ["touchstart", "click"] {
        document.add_event_listener_with_callback(event_type, on_pointer.as_ref().unchecked_ref())?;
    }
    on_pointer.forget();

    // The click also bubbles to the document as a flap, queued after this
    // restart, so the new run begins with a flap.
    let state_again = Rc::clone(&state);
    let frame_cb_again = Rc::clone(&frame_cb);
    let on_play_again = Closure::wrap(Box::new(move |_event: Event| {
        queue_input(&state_again, &frame_cb_again, InputEvent::Restart);
    }) as Box<dyn FnMut(_)>);
    state
        .borrow()
        .play_again
        .add_event_listener_with_callback("click", on_play_again.as_ref().unchecked_ref())?;
    on_play_again.forget();

    let state_resize = Rc::clone(&state);
    let resize = Closure::wrap(Box::new(move |_event: Event| {
        let mut st = state_resize.borrow_mut();
        st.last_event = "resize".to_string();
        if let Err(err) = fit_viewport(&mut st) {
            warn(&format!("resize failed: {}", js_value_to_string(&err)));
            return;
        }

        // Resizing wipes the canvas; a halted board has no next frame to
        // repaint it.
        if st.overlay_shown {
            render::draw_frame(&st.context, &st.game, &st.sprites);
            render::draw_game_over(&st.context, &st.game);
        }
        update_diagnostics(&st);
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    resize.forget();

    set_status(&document, "running");
    request_frame(&state, &frame_cb);

    Ok(())
}
