//! # Stroke Renderer
//!
//! Turns pointer events into line segments on the surface. A statemachine of two states: `Idle` and
//! `Drawing`. The stroke parameters are captured on pointer-down, so switching tools mid-stroke
//! only affects the *next* stroke.
//!
//! Committing a stroke (pointer up or leave) is reported to the caller, which owns the history.
//! The renderer itself never snapshots.
//!
//! Also home to the text insertion affordance, a tiny `Closed -> Open -> Closed` machine opened by
//! the secondary button.

use crate::{
    surface::{PixelSurface, Point},
    tools::StrokeParams,
};

#[derive(
    strum::AsRefStr,
    strum::EnumString,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    #[default]
    Primary,
    /// Right click, or long-press context menu.
    Secondary,
    /// Middle click and anything more exotic.
    Auxiliary,
}

#[derive(Copy, Clone, PartialEq, Debug, Default)]
enum StrokeState {
    #[default]
    Idle,
    Drawing {
        last: Point,
        params: StrokeParams,
    },
}

#[derive(Default, Debug)]
pub struct StrokeRenderer {
    state: StrokeState,
}
impl StrokeRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }
    /// Begin a stroke at `at`. Only the primary button draws, and only from `Idle`.
    /// Returns whether a stroke began.
    pub fn pointer_down(
        &mut self,
        surface: &mut PixelSurface,
        at: Point,
        button: PointerButton,
        params: StrokeParams,
    ) -> bool {
        if button != PointerButton::Primary || self.is_drawing() {
            return false;
        }
        surface.set_stroke_style(params);
        self.state = StrokeState::Drawing { last: at, params };
        true
    }
    /// Extend the stroke in progress to `to`. Ignored while idle.
    pub fn pointer_move(&mut self, surface: &mut PixelSurface, to: Point) {
        let StrokeState::Drawing { last, params } = &mut self.state else {
            return;
        };
        surface.stroke_segment(*last, to, params.color, params.width);
        *last = to;
    }
    /// Finish the stroke in progress, on pointer up or leave.
    /// Returns `true` if a stroke was committed and should be snapshotted.
    pub fn pointer_up(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            StrokeState::Drawing { .. } => true,
            StrokeState::Idle => false,
        }
    }
}

/// The transient text box opened by the secondary button.
#[derive(Clone, PartialEq, Debug, Default)]
pub enum TextInsertion {
    #[default]
    Closed,
    Open {
        at: Point,
        input: String,
    },
}
impl TextInsertion {
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
    #[must_use]
    pub fn anchor(&self) -> Option<Point> {
        match self {
            Self::Open { at, .. } => Some(*at),
            Self::Closed => None,
        }
    }
    /// Open at `at`, discarding any previous pending input.
    pub fn open(&mut self, at: Point) {
        *self = Self::Open {
            at,
            input: String::new(),
        };
    }
    /// Replace the pending input. Ignored while closed.
    pub fn set_input(&mut self, text: &str) {
        if let Self::Open { input, .. } = self {
            text.clone_into(input);
        }
    }
    /// Append to the pending input. Ignored while closed.
    pub fn push_str(&mut self, text: &str) {
        if let Self::Open { input, .. } = self {
            input.push_str(text);
        }
    }
    /// Close, yielding the anchor and trimmed text if there is any text to draw.
    pub fn confirm(&mut self) -> Option<(Point, String)> {
        match std::mem::take(self) {
            Self::Open { at, input } => {
                let text = input.trim();
                (!text.is_empty()).then(|| (at, text.to_owned()))
            }
            Self::Closed => None,
        }
    }
    /// Losing focus keeps whatever was typed, same as confirming.
    pub fn blur(&mut self) -> Option<(Point, String)> {
        self.confirm()
    }
    /// Close, discarding pending input.
    pub fn cancel(&mut self) {
        *self = Self::Closed;
    }
}
