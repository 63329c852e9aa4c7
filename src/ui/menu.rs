//! Vertical text menu with a wrapping selection

use crate::input::InputState;
use crate::surface::{Surface, TextAlign};

const FONT_FAMILY: &str = "Arial";
const TEXT_COLOR: &str = "White";
const SELECTED_COLOR: &str = "rgba(255,255,0,255)";

/// A titled list of labels with one selected entry
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    title: String,
    items: Vec<String>,
    selected: usize,
    /// Baseline above the first item
    y: f32,
    /// Item pitch and selected-item font size
    size: f32,
}

impl Menu {
    pub fn new<S: Into<String>>(title: impl Into<String>, items: impl IntoIterator<Item = S>, y: f32, size: f32) -> Self {
        Self {
            title: title.into(),
            items: items.into_iter().map(Into::into).collect(),
            selected: 0,
            y,
            size,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    /// Move the selection by the held up/down keys, wrapping at both ends.
    /// Reacts to the held state on every call, so a held key cycles each frame.
    pub fn input(&mut self, input: &InputState) {
        let n = self.items.len();
        if n == 0 {
            return;
        }
        if input.up {
            self.selected = (self.selected + n - 1) % n;
        }
        if input.down {
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        let center_x = surface.width() / 2.0;
        surface.set_text_align(TextAlign::Center);
        surface.set_fill_style(TEXT_COLOR);

        if !self.title.is_empty() {
            surface.set_font(&self.font(1.3));
            surface.fill_text(&self.title, center_x, surface.height() / 4.0);
        }

        let mut y = self.y;
        for (i, item) in self.items.iter().enumerate() {
            let font = if i == self.selected {
                surface.set_fill_style(SELECTED_COLOR);
                self.font(1.0)
            } else {
                self.font(0.8)
            };
            surface.set_font(&font);
            y += self.size;
            surface.fill_text(item, center_x, y);
            surface.set_fill_style(TEXT_COLOR);
        }
    }

    /// Font for `size * scale`, rounded down to whole pixels
    fn font(&self, scale: f64) -> String {
        let px = (f64::from(self.size) * scale).floor();
        format!("{px}px {FONT_FAMILY}")
    }
}
