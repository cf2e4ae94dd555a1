//! # Resize
//!
//! Surfaces are never resized in place. A resize allocates a fresh surface, paints the background,
//! and copies the old pixels back at the origin. Content is neither rescaled nor recentered:
//! growing reveals background on the right/bottom, shrinking clips.

use crate::{color::Color, surface::PixelSurface, tools::StrokeParams};

/// Build a `width`x`height` replacement for `old` with its content preserved at the origin.
///
/// Reallocation resets the draw style, so `params` are re-applied to the new surface.
#[must_use]
pub fn resize_preserving(
    old: &PixelSurface,
    width: u32,
    height: u32,
    background: Color,
    params: StrokeParams,
) -> PixelSurface {
    // Skipped for 0x0, nothing to keep.
    let preserved = old.read_all();

    let mut surface = PixelSurface::new(width, height);
    surface.fill_background(background);
    if let Some(preserved) = preserved {
        surface.write_region(&preserved, 0, 0);
    }
    surface.set_stroke_style(params);

    log::debug!(
        "Resized surface {}x{} -> {}x{}",
        old.width(),
        old.height(),
        width,
        height
    );
    surface
}
