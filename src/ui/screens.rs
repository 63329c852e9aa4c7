//! Full-screen menus shown between levels

use crate::game::Transition;
use crate::input::InputState;
use crate::surface::{Surface, TextAlign};

use super::menu::Menu;

/// Screen titles
pub mod titles {
    pub const START: &str = "Space Invaders";
    pub const GAME_OVER: &str = "Game Over";
    pub const WIN: &str = "You Win!";
    pub const HELP: &str = "Help - Controls";
}

/// Main menu entries; index 0 proceeds, index 2 opens help
pub const MENU_ITEMS: [&str; 4] = ["Play", "Settings", "Help", "Credits"];
const PLAY_INDEX: usize = 0;
const HELP_INDEX: usize = 2;

const MENU_Y: f32 = 200.0;
const MENU_SIZE: f32 = 40.0;

/// Control reference shown by the help screen
pub const CONTROL_LINES: [&str; 5] = [
    "Left Arrow: Move Left",
    "Right Arrow: Move Right",
    "Space: Fire",
    "+ : Speed Up",
    "- : Speed Down",
];
const HELP_FOOTER: &str = "(Press space to return)";

/// Start, game over and win screens: a title over the main menu.
///
/// Without a proceed action the menu is inert and "Play" does nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct GameScreen {
    menu: Menu,
    proceed: Option<Transition>,
}

impl GameScreen {
    pub fn new(title: &str, proceed: Option<Transition>) -> Self {
        Self {
            menu: Menu::new(title, MENU_ITEMS, MENU_Y, MENU_SIZE),
            proceed,
        }
    }

    pub fn start() -> Self {
        Self::new(titles::START, Some(Transition::StartGame))
    }

    pub fn game_over() -> Self {
        Self::new(titles::GAME_OVER, Some(Transition::StartGame))
    }

    pub fn win() -> Self {
        Self::new(titles::WIN, Some(Transition::StartGame))
    }

    pub fn title(&self) -> &str {
        self.menu.title()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn input(&mut self, input: &InputState) {
        if self.proceed.is_none() {
            return;
        }
        // Each held direction key runs a menu pass
        if input.up {
            self.menu.input(input);
        }
        if input.down {
            self.menu.input(input);
        }
    }

    pub fn step(&mut self, input: &InputState) -> Option<Transition> {
        if !input.fire {
            return None;
        }
        match self.menu.selected() {
            PLAY_INDEX => self.proceed,
            HELP_INDEX => Some(Transition::ShowHelp),
            _ => None,
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        self.menu.render(surface);
    }
}

/// Static control reference; fire returns to the screen that opened it
#[derive(Debug, Clone, PartialEq)]
pub struct HelpScreen {
    title: String,
    lines: Vec<String>,
    previous: Option<Box<GameScreen>>,
}

impl HelpScreen {
    pub fn new<S: Into<String>>(title: impl Into<String>, lines: impl IntoIterator<Item = S>, previous: Option<GameScreen>) -> Self {
        Self {
            title: title.into(),
            lines: lines.into_iter().map(Into::into).collect(),
            previous: previous.map(Box::new),
        }
    }

    /// The controls page, returning to `previous`
    pub fn controls(previous: GameScreen) -> Self {
        Self::new(titles::HELP, CONTROL_LINES, Some(previous))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Hand back the screen to return to
    pub fn into_previous(self) -> Option<GameScreen> {
        self.previous.map(|screen| *screen)
    }

    pub fn step(&mut self, input: &InputState) -> Option<Transition> {
        (input.fire && self.previous.is_some()).then_some(Transition::Back)
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        let center_x = surface.width() / 2.0;
        surface.set_text_align(TextAlign::Center);
        surface.set_fill_style("White");

        surface.set_font("bold 24px Arial");
        surface.fill_text(&self.title, center_x, 80.0);

        surface.set_font("16px Arial");
        let mut y = 120.0;
        for line in &self.lines {
            surface.fill_text(line, center_x, y);
            y += 30.0;
        }

        surface.set_font("14px Arial");
        surface.fill_text(HELP_FOOTER, center_x, surface.height() - 60.0);
    }
}

/// Shown while assets load
pub fn draw_loading(surface: &mut dyn Surface) {
    surface.set_fill_style("white");
    surface.set_font("bold 30px arial");
    surface.set_text_align(TextAlign::Center);
    surface.fill_text("Loading...", surface.width() / 2.0, surface.height() / 2.0);
}

/// Shown instead of the game when startup fails
pub fn draw_load_error(surface: &mut dyn Surface, message: &str) {
    let (x, y) = (surface.width() / 2.0, surface.height() / 2.0);
    surface.clear();
    surface.set_fill_style("red");
    surface.set_text_align(TextAlign::Center);
    surface.set_font("bold 20px arial");
    surface.fill_text("Failed to load game", x, y - 20.0);
    surface.set_font("14px arial");
    surface.fill_text(message, x, y + 10.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, RecordingSurface};

    fn keys(up: bool, down: bool, fire: bool) -> InputState {
        InputState {
            up,
            down,
            fire,
            ..Default::default()
        }
    }

    fn select(screen: &mut GameScreen, index: usize) {
        for _ in 0..index {
            screen.input(&keys(false, true, false));
        }
        assert_eq!(screen.menu().selected(), index);
    }

    #[test]
    fn test_play_proceeds() {
        let mut screen = GameScreen::game_over();
        assert_eq!(screen.step(&keys(false, false, true)), Some(Transition::StartGame));
        assert_eq!(screen.step(&InputState::default()), None);
    }

    #[test]
    fn test_help_entry_opens_help() {
        let mut screen = GameScreen::start();
        select(&mut screen, 2);
        assert_eq!(screen.step(&keys(false, false, true)), Some(Transition::ShowHelp));
    }

    #[test]
    fn test_settings_and_credits_do_nothing() {
        let mut screen = GameScreen::start();
        select(&mut screen, 1);
        assert_eq!(screen.step(&keys(false, false, true)), None);
        screen.input(&keys(false, true, false));
        screen.input(&keys(false, true, false));
        assert_eq!(screen.menu().selected(), 3);
        assert_eq!(screen.step(&keys(false, false, true)), None);
    }

    #[test]
    fn test_screen_without_proceed_ignores_navigation() {
        let mut screen = GameScreen::new("Paused", None);
        screen.input(&keys(true, false, false));
        assert_eq!(screen.menu().selected(), 0);
        assert_eq!(screen.step(&keys(false, false, true)), None);
    }

    #[test]
    fn test_up_and_down_together_cancel() {
        let mut screen = GameScreen::start();
        screen.input(&keys(true, true, false));
        assert_eq!(screen.menu().selected(), 0);
    }

    #[test]
    fn test_game_screen_clears_before_drawing() {
        let screen = GameScreen::win();
        let mut surface = RecordingSurface::new(500.0, 500.0);
        screen.render(&mut surface);
        assert!(matches!(surface.calls[0], DrawCall::Clear(_)));
        assert_eq!(surface.texts()[0], "You Win!");
        assert_eq!(surface.texts().len(), 5);
    }

    #[test]
    fn test_help_returns_the_screen_that_opened_it() {
        let mut screen = GameScreen::start();
        select(&mut screen, 2);
        let mut help = HelpScreen::controls(screen.clone());

        assert_eq!(help.step(&InputState::default()), None);
        assert_eq!(help.step(&keys(false, false, true)), Some(Transition::Back));
        let back = help.into_previous().unwrap();
        assert_eq!(back, screen);
        assert_eq!(back.menu().selected(), 2);
    }

    #[test]
    fn test_help_without_previous_stays() {
        let mut help = HelpScreen::new("Help", ["a"], None);
        assert_eq!(help.step(&keys(false, false, true)), None);
    }

    #[test]
    fn test_help_render_layout() {
        let help = HelpScreen::controls(GameScreen::start());
        let mut surface = RecordingSurface::new(500.0, 500.0);
        help.render(&mut surface);

        let texts = surface.texts();
        assert_eq!(texts.first(), Some(&"Help - Controls"));
        assert_eq!(&texts[1..6], &CONTROL_LINES);
        assert_eq!(texts.last(), Some(&HELP_FOOTER));

        let ys: Vec<f32> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        assert_eq!(ys, vec![80.0, 120.0, 150.0, 180.0, 210.0, 240.0, 440.0]);
    }

    #[test]
    fn test_load_error_shows_reason() {
        let mut surface = RecordingSurface::new(500.0, 500.0);
        draw_load_error(&mut surface, "failed to load media/laser.ogg: 404");
        assert_eq!(
            surface.texts(),
            vec!["Failed to load game", "failed to load media/laser.ogg: 404"]
        );
    }
}
