//! Menu and screen states shown around the board

pub mod menu;
pub mod screens;

pub use menu::Menu;
pub use screens::{
    CONTROL_LINES, GameScreen, HelpScreen, MENU_ITEMS, draw_load_error, draw_loading, titles,
};
