//! Drawing surface abstraction
//!
//! The core treats the surface as an opaque sink: it clears regions, blits
//! atlas regions and draws text, and never reads pixels back.

use crate::atlas::SheetImage;

/// Axis-aligned rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// 2D raster sink the board and screens render into
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn clear_rect(&mut self, region: Rect);
    fn draw_image(&mut self, image: &SheetImage, src: Rect, dst: Rect);
    fn fill_text(&mut self, text: &str, x: f32, y: f32);

    /// CSS font shorthand, e.g. `"bold 16px arial"`
    fn set_font(&mut self, font: &str);
    /// CSS color, e.g. `"White"` or `"#F3F315"`
    fn set_fill_style(&mut self, style: &str);
    fn set_text_align(&mut self, align: TextAlign);

    /// Clear the whole surface
    fn clear(&mut self) {
        let region = Rect::new(0.0, 0.0, self.width(), self.height());
        self.clear_rect(region);
    }
}

/// A single recorded drawing command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Rect),
    Image {
        sheet: String,
        src: Rect,
        dst: Rect,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        font: String,
        fill: String,
        align: TextAlign,
    },
}

/// Surface that records commands instead of drawing (headless runs, tests)
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    font: String,
    fill: String,
    align: TextAlign,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            font: "10px sans-serif".to_string(),
            fill: "#000000".to_string(),
            align: TextAlign::Left,
            calls: Vec::new(),
        }
    }

    /// Forget everything recorded so far
    pub fn reset(&mut self) {
        self.calls.clear();
    }

    /// Destination rectangles of every blit, in draw order
    pub fn blits(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Image { dst, .. } => Some(*dst),
                _ => None,
            })
            .collect()
    }

    /// Every string drawn, in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear_rect(&mut self, region: Rect) {
        self.calls.push(DrawCall::Clear(region));
    }

    fn draw_image(&mut self, image: &SheetImage, src: Rect, dst: Rect) {
        self.calls.push(DrawCall::Image {
            sheet: image.path.clone(),
            src,
            dst,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            font: self.font.clone(),
            fill: self.fill.clone(),
            align: self.align,
        });
    }

    fn set_font(&mut self, font: &str) {
        self.font = font.to_string();
    }

    fn set_fill_style(&mut self, style: &str) {
        self.fill = style.to_string();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.align = align;
    }
}
