//! # Themes
//!
//! A theme is a named color scheme applied to the whole canvas: a background and a default ink.
//! Themes are identified in storage by their lowercase name, e.g. `"blackboard"`.

use crate::color::Color;

#[derive(
    strum::AsRefStr,
    strum::Display,
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
pub enum Theme {
    #[default]
    Whiteboard,
    Blackboard,
    Eyecare,
    Reading,
}
impl Theme {
    #[must_use]
    pub const fn background(self) -> Color {
        match self {
            Self::Whiteboard => Color::WHITE,
            Self::Blackboard => Color::rgb(0x1f, 0x2a, 0x24),
            Self::Eyecare => Color::rgb(0xc7, 0xed, 0xcc),
            Self::Reading => Color::rgb(0xf4, 0xec, 0xd8),
        }
    }
    /// Default pen color, used when the user has not chosen one.
    #[must_use]
    pub const fn ink(self) -> Color {
        match self {
            Self::Whiteboard => Color::BLACK,
            Self::Blackboard => Color::rgb(0xf5, 0xf5, 0xf5),
            Self::Eyecare => Color::rgb(0x2e, 0x3b, 0x2e),
            Self::Reading => Color::rgb(0x3b, 0x30, 0x24),
        }
    }
    /// The identifier written to theme storage.
    #[must_use]
    pub fn id(self) -> &'static str {
        // strum's AsRefStr borrows from self, but the names are static anyway.
        match self {
            Self::Whiteboard => "whiteboard",
            Self::Blackboard => "blackboard",
            Self::Eyecare => "eyecare",
            Self::Reading => "reading",
        }
    }
}
