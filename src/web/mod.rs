//! Browser host
//!
//! Wires the game to a canvas, `<audio>` channels and keyboard events, then
//! drives it from `requestAnimationFrame`. The loop stops while the tab is
//! hidden.

pub mod canvas;
pub mod media;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, KeyboardEvent};

use crate::atlas::SpriteSheet;
use crate::audio::{ChannelPool, default_sound_files};
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::game::{Game, GameCallbacks};
use crate::input::{InputState, Key};
use crate::sim::{GameAssets, LevelSet};
use crate::ui::{draw_load_error, draw_loading};

pub use canvas::CanvasSurface;
pub use media::{HtmlAudioBackend, LoadedMedia, load_media};

/// Milestones only go to the console in the browser build
struct ConsoleCallbacks;

impl GameCallbacks for ConsoleCallbacks {
    fn on_start(&mut self) {
        log::info!("Game started");
    }

    fn on_die(&mut self) {
        log::info!("Game over");
    }

    fn on_win(&mut self) {
        log::info!("All levels cleared");
    }
}

/// Everything one running page owns
struct Host {
    game: Game,
    input: InputState,
    surface: CanvasSurface,
    audio: ChannelPool<HtmlAudioBackend>,
    /// Pending animation frame, cancelled on pause
    frame: Option<PendingFrame>,
}

/// A scheduled frame and the callback it will run. Dropping the callback
/// releases its handle on the host.
struct PendingFrame {
    handle: i32,
    _callback: Closure<dyn FnMut(f64)>,
}

/// Load assets into the canvas with id `canvas_id` and start the loop
pub async fn start(canvas_id: &str) {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

    log::info!("Canvas Invaders starting...");

    let window = web_sys::window().expect("no window");
    let document = window.document().expect("no document");
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .expect("no canvas")
        .dyn_into()
        .expect("not a canvas");
    let mut surface = CanvasSurface::new(&canvas).expect("no 2d context");

    draw_loading(&mut surface);

    let mut config = GameConfig::load();
    config.width = canvas.width() as f32;
    config.height = canvas.height() as f32;

    let host = match build_host(config, surface).await {
        Ok(host) => Rc::new(RefCell::new(host)),
        Err((mut surface, e)) => {
            log::error!("Failed to initialize game: {}", e);
            draw_load_error(&mut surface, &e.to_string());
            return;
        }
    };

    setup_input_handlers(host.clone());
    setup_auto_pause(host.clone());
    request_frame(host);

    log::info!("Canvas Invaders running!");
}

/// All-or-nothing startup: on failure the surface comes back for the error text
async fn build_host(config: GameConfig, surface: CanvasSurface) -> Result<Host, (CanvasSurface, EngineError)> {
    let mut sprites = match SpriteSheet::builtin() {
        Ok(sprites) => sprites,
        Err(e) => return Err((surface, e)),
    };
    let sounds = default_sound_files();
    let mut media = match load_media(&sprites.image.path, &sounds).await {
        Ok(media) => media,
        Err(e) => return Err((surface, e)),
    };
    sprites.image.element = Some(media.sheet);

    let backend = match HtmlAudioBackend::new(config.audio_channels) {
        Ok(backend) => backend,
        Err(e) => return Err((surface, EngineError::asset_load("audio channels", format!("{:?}", e)))),
    };
    let mut audio = ChannelPool::new(backend, config.audio_channels);
    let loaded = audio.load_with(&sounds, |path| {
        media
            .clips
            .remove(path)
            .ok_or_else(|| "not loaded".to_string())
    });
    if let Err(e) = loaded {
        return Err((surface, e));
    }

    let game = LevelSet::builtin()
        .and_then(|levels| GameAssets::new(sprites, levels))
        .and_then(|assets| Game::new(config, assets, Box::new(ConsoleCallbacks)));
    match game {
        Ok(game) => Ok(Host {
            game,
            input: InputState::default(),
            surface,
            audio,
            frame: None,
        }),
        Err(e) => Err((surface, e)),
    }
}

fn request_frame(host: Rc<RefCell<Host>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let next = host.clone();
    let callback: Closure<dyn FnMut(f64)> = Closure::once(move |time: f64| {
        run_frame(next, time);
    });
    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        Ok(handle) => {
            host.borrow_mut().frame = Some(PendingFrame {
                handle,
                _callback: callback,
            })
        }
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
}

fn run_frame(host: Rc<RefCell<Host>>, time: f64) {
    {
        let mut h = host.borrow_mut();
        // The running callback is released once it returns
        let _spent = h.frame.take();
        if h.game.is_paused() {
            return;
        }
        let Host {
            game,
            input,
            surface,
            audio,
            ..
        } = &mut *h;
        game.frame(time, input, surface, audio);
    }

    request_frame(host);
}

fn pause(host: &Rc<RefCell<Host>>) {
    let mut h = host.borrow_mut();
    h.game.pause();
    if let Some(frame) = h.frame.take() {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(frame.handle);
        }
    }
}

fn resume(host: Rc<RefCell<Host>>) {
    let resumed = host.borrow_mut().game.resume();
    if resumed {
        request_frame(host);
    }
}

fn setup_input_handlers(host: Rc<RefCell<Host>>) {
    let window = web_sys::window().unwrap();

    // Key down
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(key) = Key::from_key_name(&event.key()) {
                // Arrows and space would scroll the page
                event.prevent_default();
                host.borrow_mut().input.set(key, true);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Key up
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(key) = Key::from_key_name(&event.key()) {
                host.borrow_mut().input.set(key, false);
            }
        });
        let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn setup_auto_pause(host: Rc<RefCell<Host>>) {
    let window = web_sys::window().unwrap();
    let document = window.document().unwrap();

    // Visibility change (tab switch, minimize)
    {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                pause(&host);
                log::info!("Auto-paused (tab hidden)");
            } else {
                // Held keys were released while hidden
                host.borrow_mut().input = InputState::default();
                resume(host.clone());
            }
        });
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        );
        closure.forget();
    }
}
