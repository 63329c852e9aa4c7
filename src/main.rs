//! Canvas Invaders entry point
//!
//! The browser build runs the canvas host. The native build plays a short
//! scripted session headless and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    canvas_invaders::web::start("gameboard").await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Canvas Invaders (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the playable version");

    if let Err(e) = headless::run(600) {
        log::error!("Headless session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use canvas_invaders::audio::{ChannelPool, SilentBackend, default_sound_files};
    use canvas_invaders::game::Active;
    use canvas_invaders::input::InputState;
    use canvas_invaders::sim::GameAssets;
    use canvas_invaders::surface::RecordingSurface;
    use canvas_invaders::{EngineError, Game, GameCallbacks, GameConfig};

    /// Frame period the session is timed at
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Clip length given to every silent sound (seconds)
    const CLIP_SECS: f64 = 0.4;

    struct LogCallbacks;

    impl GameCallbacks for LogCallbacks {
        fn on_start(&mut self) {
            log::info!("on_start");
        }

        fn on_die(&mut self) {
            log::info!("on_die");
        }

        fn on_win(&mut self) {
            log::info!("on_win");
        }
    }

    /// Fire to leave the title screen, then sweep left and right while firing
    fn scripted_input(frame: u32) -> InputState {
        let sweep_right = (frame / 120) % 2 == 0;
        InputState {
            fire: true,
            left: !sweep_right,
            right: sweep_right,
            ..Default::default()
        }
    }

    pub fn run(frames: u32) -> Result<(), EngineError> {
        let config = GameConfig::load();
        let mut surface = RecordingSurface::new(config.width, config.height);
        let mut audio = ChannelPool::new(SilentBackend::default(), config.audio_channels);
        audio.load_with(&default_sound_files(), |_| Ok(CLIP_SECS))?;

        let mut game = Game::new(config, GameAssets::builtin()?, Box::new(LogCallbacks))?;

        for frame in 0..frames {
            let now = f64::from(frame) * FRAME_MS;
            audio.backend_mut().now_ms = now;
            let mut input = scripted_input(frame);
            surface.reset();
            game.frame(now, &mut input, &mut surface, &mut audio);
        }

        match game.active() {
            Active::Level(board) => log::info!(
                "Level {}: {} entities, {} player missiles in flight",
                board.level(),
                board.len(),
                board.missiles()
            ),
            Active::Menu(screen) => log::info!("Stopped on screen \"{}\"", screen.title()),
            Active::Help(_) => log::info!("Stopped on the help screen"),
        }
        log::info!(
            "{} frames, {} sounds started, last frame drew {} sprites",
            frames,
            audio.backend().started.len(),
            surface.blits().len()
        );
        Ok(())
    }
}
