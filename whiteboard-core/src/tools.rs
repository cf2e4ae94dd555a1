//! # Tool State
//!
//! Tracks which tool the pointer drives and derives the parameters the next stroke is drawn with.
//! The eraser is not a transparency brush: it paints the theme's background color.

use crate::{color::Color, theme::Theme};

pub const MIN_PEN_WIDTH: u32 = 1;
pub const MAX_PEN_WIDTH: u32 = 20;
pub const DEFAULT_PEN_WIDTH: u32 = 2;
pub const ERASER_WIDTH: u32 = 20;

#[derive(
    strum::AsRefStr,
    strum::EnumString,
    strum::EnumIter,
    PartialEq,
    Eq,
    Copy,
    Clone,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

/// Color and width a stroke is rendered with, captured when the stroke begins.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct StrokeParams {
    pub color: Color,
    pub width: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolState {
    active: Tool,
    pen_width: u32,
    /// User override. `None` follows the theme's ink.
    pen_color: Option<Color>,
    theme: Theme,
}
impl Default for ToolState {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}
impl ToolState {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            active: Tool::Pen,
            pen_width: DEFAULT_PEN_WIDTH,
            pen_color: None,
            theme,
        }
    }
    pub fn select_tool(&mut self, tool: Tool) {
        if self.active != tool {
            log::trace!("Tool {:?} -> {:?}", self.active, tool);
        }
        self.active = tool;
    }
    /// Set the pen width, clamped to `MIN_PEN_WIDTH..=MAX_PEN_WIDTH`.
    pub fn set_pen_width(&mut self, width: u32) {
        self.pen_width = width.clamp(MIN_PEN_WIDTH, MAX_PEN_WIDTH);
    }
    /// `None` resets to the theme's default ink.
    pub fn set_pen_color(&mut self, color: Option<Color>) {
        self.pen_color = color;
    }
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.active
    }
    #[must_use]
    pub fn pen_width(&self) -> u32 {
        self.pen_width
    }
    #[must_use]
    pub fn pen_color_override(&self) -> Option<Color> {
        self.pen_color
    }
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }
    #[must_use]
    pub fn background(&self) -> Color {
        self.theme.background()
    }
    /// Always the background. There is no transparent erasing.
    #[must_use]
    pub fn eraser_color(&self) -> Color {
        self.background()
    }
    /// The pen color, accounting for user override vs. theme default.
    #[must_use]
    pub fn pen_color(&self) -> Color {
        self.pen_color.unwrap_or_else(|| self.theme.ink())
    }
    #[must_use]
    pub fn effective_stroke_params(&self) -> StrokeParams {
        match self.active {
            Tool::Pen => StrokeParams {
                color: self.pen_color(),
                width: self.pen_width,
            },
            Tool::Eraser => StrokeParams {
                color: self.eraser_color(),
                width: ERASER_WIDTH,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Tool, ToolState, ERASER_WIDTH, MAX_PEN_WIDTH, MIN_PEN_WIDTH};
    use crate::{color::Color, theme::Theme};

    #[test]
    fn pen_follows_theme_ink() {
        let mut tools = ToolState::new(Theme::Whiteboard);
        assert_eq!(tools.effective_stroke_params().color, Color::BLACK);
        tools.set_theme(Theme::Blackboard);
        assert_eq!(tools.effective_stroke_params().color, Theme::Blackboard.ink());
    }
    #[test]
    fn override_survives_theme_change() {
        let red = Color::rgb(255, 0, 0);
        let mut tools = ToolState::new(Theme::Whiteboard);
        tools.set_pen_color(Some(red));
        tools.set_theme(Theme::Reading);
        assert_eq!(tools.effective_stroke_params().color, red);
        tools.set_pen_color(None);
        assert_eq!(tools.effective_stroke_params().color, Theme::Reading.ink());
    }
    #[test]
    fn eraser_uses_background() {
        let mut tools = ToolState::new(Theme::Eyecare);
        tools.set_pen_width(3);
        tools.select_tool(Tool::Eraser);
        let params = tools.effective_stroke_params();
        assert_eq!(params.color, Theme::Eyecare.background());
        assert_eq!(params.width, ERASER_WIDTH);
        // Pen width is remembered.
        tools.select_tool(Tool::Pen);
        assert_eq!(tools.effective_stroke_params().width, 3);
    }
    #[test]
    fn width_is_clamped() {
        let mut tools = ToolState::default();
        tools.set_pen_width(0);
        assert_eq!(tools.pen_width(), MIN_PEN_WIDTH);
        tools.set_pen_width(500);
        assert_eq!(tools.pen_width(), MAX_PEN_WIDTH);
    }
}
