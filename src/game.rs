//! Frame driver
//!
//! Owns whichever board or screen is active, turns display timestamps into
//! clamped deltas, and applies the transitions the active scene reports.
//! It is the only place boards are constructed.

use std::rc::Rc;

use crate::audio::AudioPort;
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::input::InputState;
use crate::sim::{Board, GameAssets, LevelOutcome};
use crate::surface::Surface;
use crate::ui::{GameScreen, HelpScreen};

/// Something the active scene asks the driver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Build a board at the configured start level
    StartGame,
    /// Open the controls page over the current screen
    ShowHelp,
    /// Leave the controls page
    Back,
    /// Level cleared and another follows
    AdvanceLevel(u32),
    PlayerDied,
    /// Last level cleared
    Won,
}

/// Per-frame contract shared by boards and screens
pub trait Scene {
    /// Read input ahead of the step
    fn input(&mut self, input: &InputState, dt: f32);
    fn step(&mut self, input: &InputState, dt: f32, audio: &mut dyn AudioPort) -> Option<Transition>;
    fn render(&self, surface: &mut dyn Surface);
}

impl Scene for Board {
    /// The player reads input during its own step
    fn input(&mut self, _input: &InputState, _dt: f32) {}

    fn step(&mut self, input: &InputState, dt: f32, audio: &mut dyn AudioPort) -> Option<Transition> {
        Board::step(self, dt, input, audio);
        self.take_outcome().map(|outcome| match outcome {
            LevelOutcome::PlayerDied => Transition::PlayerDied,
            LevelOutcome::Cleared { next_level: Some(level) } => Transition::AdvanceLevel(level),
            LevelOutcome::Cleared { next_level: None } => Transition::Won,
        })
    }

    fn render(&self, surface: &mut dyn Surface) {
        Board::render(self, surface);
    }
}

impl Scene for GameScreen {
    fn input(&mut self, input: &InputState, _dt: f32) {
        GameScreen::input(self, input);
    }

    fn step(&mut self, input: &InputState, _dt: f32, _audio: &mut dyn AudioPort) -> Option<Transition> {
        GameScreen::step(self, input)
    }

    fn render(&self, surface: &mut dyn Surface) {
        GameScreen::render(self, surface);
    }
}

impl Scene for HelpScreen {
    fn input(&mut self, _input: &InputState, _dt: f32) {}

    fn step(&mut self, input: &InputState, _dt: f32, _audio: &mut dyn AudioPort) -> Option<Transition> {
        HelpScreen::step(self, input)
    }

    fn render(&self, surface: &mut dyn Surface) {
        HelpScreen::render(self, surface);
    }
}

/// What the driver is currently running
#[derive(Debug)]
pub enum Active {
    Level(Board),
    Menu(GameScreen),
    Help(HelpScreen),
}

impl Active {
    pub fn scene(&self) -> &dyn Scene {
        match self {
            Active::Level(board) => board,
            Active::Menu(screen) => screen,
            Active::Help(help) => help,
        }
    }

    pub fn scene_mut(&mut self) -> &mut dyn Scene {
        match self {
            Active::Level(board) => board,
            Active::Menu(screen) => screen,
            Active::Help(help) => help,
        }
    }
}

/// Turns display timestamps into simulation deltas
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
    paused: bool,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
            paused: false,
        }
    }

    /// Seconds since the previous tick, clamped to `[0, max_dt]`.
    /// The first tick after construction or resume yields 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = self
            .last_ms
            .map(|last| ((now_ms - last) / 1000.0) as f32)
            .unwrap_or(0.0);
        self.last_ms = Some(now_ms);
        dt.max(0.0).min(self.max_dt)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Returns false when the clock was not paused
    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        self.last_ms = None;
        true
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Hooks a host can attach to game milestones
pub trait GameCallbacks {
    fn on_start(&mut self) {}
    fn on_die(&mut self) {}
    fn on_win(&mut self) {}
}

impl GameCallbacks for () {}

/// Speed readout drawn over every frame. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedOverlay {
    dx: u32,
}

impl SpeedOverlay {
    const STEP: u32 = 10;
    const MAX: u32 = 100;

    pub fn speed_up(&mut self) {
        if self.dx < Self::MAX {
            self.dx += Self::STEP;
            log::debug!("dx: {}", self.dx);
        }
    }

    pub fn speed_down(&mut self) {
        if self.dx > 0 {
            self.dx -= Self::STEP;
            log::debug!("dx: {}", self.dx);
        }
    }

    pub fn label(&self) -> String {
        format!("Speed: {:.1}", f64::from(self.dx))
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.set_font("bold 16px arial");
        surface.set_fill_style("#F3F315");
        let (x, y) = (surface.width() / 2.0 + 150.0, surface.height() / 2.0 - 230.0);
        surface.fill_text(&self.label(), x, y);
    }
}

impl Default for SpeedOverlay {
    fn default() -> Self {
        Self { dx: 30 }
    }
}

/// The running game: one active scene plus the frame clock
pub struct Game {
    config: GameConfig,
    assets: Rc<GameAssets>,
    active: Active,
    clock: FrameClock,
    speed: SpeedOverlay,
    callbacks: Box<dyn GameCallbacks>,
}

impl Game {
    /// Start on the title screen. Fails on a config the simulation cannot
    /// run with or a start level that has no layout.
    pub fn new(config: GameConfig, assets: GameAssets, callbacks: Box<dyn GameCallbacks>) -> Result<Self, EngineError> {
        config.validate()?;
        if !assets.levels.contains(config.start_level) {
            return Err(EngineError::LevelNotFound {
                level: config.start_level,
            });
        }
        log::info!(
            "Game ready: {} sprites, {} levels",
            assets.sprites.len(),
            assets.levels.len()
        );
        Ok(Self {
            clock: FrameClock::new(config.max_frame_dt),
            config,
            assets: Rc::new(assets),
            active: Active::Menu(GameScreen::start()),
            speed: SpeedOverlay::default(),
            callbacks,
        })
    }

    /// Run one display frame at `timestamp_ms`. Skipped while paused.
    pub fn frame(&mut self, timestamp_ms: f64, input: &mut InputState, surface: &mut dyn Surface, audio: &mut dyn AudioPort) {
        if self.clock.is_paused() {
            return;
        }
        let dt = self.clock.tick(timestamp_ms);
        self.advance(dt, input, surface, audio);
    }

    /// input, step, transition, render, overlay; then clear one-shot keys
    pub fn advance(&mut self, dt: f32, input: &mut InputState, surface: &mut dyn Surface, audio: &mut dyn AudioPort) {
        if input.speed_up {
            self.speed.speed_up();
        }
        if input.speed_down {
            self.speed.speed_down();
        }

        let scene = self.active.scene_mut();
        scene.input(input, dt);
        if let Some(transition) = scene.step(input, dt, audio) {
            self.apply(transition);
        }

        self.active.scene().render(surface);
        self.speed.render(surface);
        input.clear_one_shots();
    }

    fn apply(&mut self, transition: Transition) {
        log::debug!("Transition: {:?}", transition);
        match transition {
            Transition::StartGame => {
                if self.load_level(self.config.start_level) {
                    self.callbacks.on_start();
                }
            }
            Transition::AdvanceLevel(level) => {
                self.load_level(level);
            }
            Transition::PlayerDied => {
                self.callbacks.on_die();
                self.active = Active::Menu(GameScreen::game_over());
            }
            Transition::Won => {
                self.callbacks.on_win();
                self.active = Active::Menu(GameScreen::win());
            }
            Transition::ShowHelp => {
                self.active = match self.take_active() {
                    Active::Menu(screen) => Active::Help(HelpScreen::controls(screen)),
                    other => other,
                };
            }
            Transition::Back => {
                self.active = match self.take_active() {
                    Active::Help(help) => Active::Menu(help.into_previous().unwrap_or_else(GameScreen::start)),
                    other => other,
                };
            }
        }
    }

    /// Swap in a fresh board for `level`; on failure the active scene stays
    fn load_level(&mut self, level: u32) -> bool {
        match Board::new(level, Rc::clone(&self.assets), &self.config) {
            Ok(board) => {
                self.active = Active::Level(board);
                true
            }
            Err(e) => {
                log::error!("Failed to load level {}: {}", level, e);
                false
            }
        }
    }

    fn take_active(&mut self) -> Active {
        std::mem::replace(&mut self.active, Active::Menu(GameScreen::start()))
    }

    pub fn pause(&mut self) {
        log::info!("Game paused");
        self.clock.pause();
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.clock.resume();
        if resumed {
            log::info!("Game resumed");
        }
        resumed
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn active(&self) -> &Active {
        &self.active
    }

    pub fn board(&self) -> Option<&Board> {
        match &self.active {
            Active::Level(board) => Some(board),
            _ => None,
        }
    }

    pub fn board_mut(&mut self) -> Option<&mut Board> {
        match &mut self.active {
            Active::Level(board) => Some(board),
            _ => None,
        }
    }

    pub fn speed(&self) -> &SpeedOverlay {
        &self.speed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn assets(&self) -> &GameAssets {
        &self.assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::SpriteSheet;
    use crate::audio::RecordingAudio;
    use crate::sim::{LevelSet, SpawnOptions};
    use crate::surface::{DrawCall, RecordingSurface};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default, Clone)]
    struct Log(Rc<RefCell<Vec<&'static str>>>);

    impl GameCallbacks for Log {
        fn on_start(&mut self) {
            self.0.borrow_mut().push("start");
        }
        fn on_die(&mut self) {
            self.0.borrow_mut().push("die");
        }
        fn on_win(&mut self) {
            self.0.borrow_mut().push("win");
        }
    }

    struct Harness {
        game: Game,
        log: Log,
        surface: RecordingSurface,
        audio: RecordingAudio,
    }

    impl Harness {
        fn new(levels: &[(u32, Vec<Vec<u8>>)]) -> Self {
            let levels = LevelSet::new(levels.iter().cloned().collect::<BTreeMap<_, _>>());
            let assets = GameAssets::new(SpriteSheet::builtin().unwrap(), levels).unwrap();
            let config = GameConfig {
                alien_fire_chance: 0.0,
                ..Default::default()
            };
            let log = Log::default();
            Self {
                game: Game::new(config, assets, Box::new(log.clone())).unwrap(),
                log,
                surface: RecordingSurface::new(500.0, 500.0),
                audio: RecordingAudio::default(),
            }
        }

        fn advance(&mut self, mut input: InputState) -> InputState {
            self.surface.reset();
            self.game
                .advance(0.01, &mut input, &mut self.surface, &mut self.audio);
            input
        }

        fn press_fire(&mut self) {
            self.advance(InputState {
                fire: true,
                ..Default::default()
            });
        }

        fn events(&self) -> Vec<&'static str> {
            self.log.0.borrow().clone()
        }
    }

    fn title_of(game: &Game) -> Option<&str> {
        match game.active() {
            Active::Menu(screen) => Some(screen.title()),
            _ => None,
        }
    }

    #[test]
    fn test_clock_first_frame_is_zero_and_clamps() {
        let mut clock = FrameClock::new(0.1);
        assert_eq!(clock.tick(1000.0), 0.0);
        assert!((clock.tick(1016.0) - 0.016).abs() < 1e-6);
        assert_eq!(clock.tick(3016.0), 0.1);
        assert_eq!(clock.tick(3000.0), 0.0);
    }

    #[test]
    fn test_clock_resume_resets_baseline() {
        let mut clock = FrameClock::new(0.1);
        clock.tick(0.0);
        assert!(!clock.resume());
        clock.pause();
        assert!(clock.is_paused());
        assert!(clock.resume());
        assert_eq!(clock.tick(60_000.0), 0.0);
        assert!((clock.tick(60_050.0) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_game_rejects_missing_start_level() {
        let assets = GameAssets::new(
            SpriteSheet::builtin().unwrap(),
            LevelSet::new(BTreeMap::from([(2, vec![vec![1]])])),
        )
        .unwrap();
        let err = Game::new(GameConfig::default(), assets, Box::new(())).err().unwrap();
        assert!(matches!(err, EngineError::LevelNotFound { level: 1 }));
    }

    #[test]
    fn test_starts_on_title_screen_and_play_loads_level() {
        let mut h = Harness::new(&[(1, vec![vec![1]])]);
        assert_eq!(title_of(&h.game), Some("Space Invaders"));

        h.press_fire();
        let board = h.game.board().unwrap();
        assert_eq!(board.level(), 1);
        assert_eq!(board.len(), 6);
        assert_eq!(h.events(), vec!["start"]);
        // The new board is drawn in the same frame
        assert_eq!(h.surface.blits().len(), 5);
    }

    #[test]
    fn test_help_round_trip_returns_same_screen() {
        let mut h = Harness::new(&[(1, vec![vec![1]])]);
        let down = InputState {
            down: true,
            ..Default::default()
        };
        h.advance(down);
        h.advance(down);

        h.press_fire();
        assert!(matches!(h.game.active(), Active::Help(_)));
        assert_eq!(h.surface.texts()[0], "Help - Controls");

        h.press_fire();
        match h.game.active() {
            Active::Menu(screen) => {
                assert_eq!(screen.title(), "Space Invaders");
                assert_eq!(screen.menu().selected(), 2);
            }
            other => panic!("expected menu, got {:?}", other),
        }
        assert!(h.events().is_empty());
    }

    #[test]
    fn test_player_death_shows_game_over() {
        let mut h = Harness::new(&[(1, vec![vec![1]])]);
        h.press_fire();

        let board = h.game.board_mut().unwrap();
        let player = board.entity(board.player().unwrap()).unwrap().pos;
        board
            .add_sprite("missile", player.x + 5.0, player.y - 0.5, SpawnOptions::alien_missile(100.0))
            .unwrap();
        h.advance(InputState::default());

        assert_eq!(title_of(&h.game), Some("Game Over"));
        assert_eq!(h.events(), vec!["start", "die"]);

        // Play again
        h.press_fire();
        assert_eq!(h.game.board().unwrap().level(), 1);
        assert_eq!(h.events(), vec!["start", "die", "start"]);
    }

    #[test]
    fn test_clearing_levels_advances_then_wins() {
        let mut h = Harness::new(&[(1, vec![vec![1]]), (2, vec![vec![1]])]);
        h.press_fire();

        for expected_level in [1, 2] {
            let board = h.game.board_mut().unwrap();
            assert_eq!(board.level(), expected_level);
            let alien = board
                .entities()
                .iter()
                .find(|e| e.as_alien().is_some())
                .unwrap()
                .id;
            board.kill(alien, &mut RecordingAudio::default());
            // The queued removal lands before the flock counts
            h.advance(InputState::default());
        }

        assert_eq!(title_of(&h.game), Some("You Win!"));
        assert_eq!(h.events(), vec!["start", "win"]);
    }

    #[test]
    fn test_speed_overlay_is_drawn_last_and_bounded() {
        let mut h = Harness::new(&[(1, vec![vec![1]])]);
        h.advance(InputState::default());
        match h.surface.calls.last() {
            Some(DrawCall::Text { text, x, y, font, fill, .. }) => {
                assert_eq!(text, "Speed: 30.0");
                assert_eq!((*x, *y), (400.0, 20.0));
                assert_eq!(font, "bold 16px arial");
                assert_eq!(fill, "#F3F315");
            }
            other => panic!("expected overlay text, got {:?}", other),
        }

        let up = InputState {
            speed_up: true,
            ..Default::default()
        };
        let after = h.advance(up);
        assert!(!after.speed_up);
        assert_eq!(h.game.speed().label(), "Speed: 40.0");

        for _ in 0..10 {
            h.advance(up);
        }
        assert_eq!(h.game.speed().label(), "Speed: 100.0");

        let down = InputState {
            speed_down: true,
            ..Default::default()
        };
        for _ in 0..20 {
            h.advance(down);
        }
        assert_eq!(h.game.speed().label(), "Speed: 0.0");
    }

    #[test]
    fn test_paused_game_skips_frames() {
        let mut h = Harness::new(&[(1, vec![vec![1]])]);
        h.game.pause();
        let mut input = InputState {
            fire: true,
            ..Default::default()
        };
        h.game.frame(0.0, &mut input, &mut h.surface, &mut h.audio);
        assert!(h.surface.calls.is_empty());
        assert!(h.game.board().is_none());

        assert!(h.game.resume());
        h.game.frame(16.0, &mut input, &mut h.surface, &mut h.audio);
        assert!(h.game.board().is_some());
    }
}
