//! # History
//!
//! Undo is implemented by keeping whole-surface snapshots rather than inverse commands: strokes
//! are rasterized immediately, so there is nothing smaller to invert.
//!
//! The stack is oldest-first. Its last entry always matches what is on the surface right after the
//! most recent committed action, so undo is "drop the last entry, paint the one before it". The
//! first entry is the baseline and is never popped. There is no redo.

use std::collections::VecDeque;

use crate::{
    color::Color,
    surface::{PixelSurface, RegionData},
};

/// Maximum number of snapshots retained, including the baseline.
pub const MAX_HISTORY: usize = 30;

/// A capture of the entire surface at one instant.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Snapshot(RegionData);
impl Snapshot {
    /// Capture the surface, or `None` if it has no area.
    #[must_use]
    pub fn capture(surface: &PixelSurface) -> Option<Self> {
        surface.read_all().map(Self)
    }
    #[must_use]
    pub fn data(&self) -> &RegionData {
        &self.0
    }
}

pub struct History {
    stack: VecDeque<Snapshot>,
    capacity: usize,
}
impl Default for History {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}
impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// # Panics
    /// If `capacity` is zero - the baseline needs somewhere to live.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "history needs room for at least the baseline");
        Self {
            stack: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.stack.len() > 1
    }
    /// Capture the surface and push it, evicting the oldest entries past capacity.
    ///
    /// An unreadable (zero-area) surface is logged and skipped; this never fails the caller.
    pub fn snapshot(&mut self, surface: &PixelSurface) {
        let Some(snapshot) = Snapshot::capture(surface) else {
            log::warn!(
                "Skipping history snapshot of a {}x{} surface",
                surface.width(),
                surface.height()
            );
            return;
        };
        self.stack.push_back(snapshot);
        while self.stack.len() > self.capacity {
            self.stack.pop_front();
        }
        log::trace!("History depth {}", self.stack.len());
    }
    /// Revert the surface to the previous snapshot. Returns whether anything happened.
    ///
    /// If the surface was resized since the snapshot was taken, the surface is first filled with
    /// `background` and the snapshot is written at the origin.
    pub fn undo(&mut self, surface: &mut PixelSurface, background: Color) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.stack.pop_back();
        // Can't fail - there were at least two.
        let Some(previous) = self.stack.back() else {
            return false;
        };
        if previous.data().dimensions() != surface.dimensions() {
            surface.fill_background(background);
        }
        surface.write_region(previous.data(), 0, 0);
        true
    }
    /// Discard everything, leaving one fresh snapshot of the surface as the baseline.
    pub fn reset(&mut self, surface: &PixelSurface) {
        self.stack.clear();
        self.snapshot(surface);
    }
    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod test {
    use super::{History, MAX_HISTORY};
    use crate::{
        color::Color,
        surface::{PixelSurface, Point},
    };

    fn blank() -> PixelSurface {
        let mut surface = PixelSurface::new(32, 16);
        surface.fill_background(Color::WHITE);
        surface
    }
    fn mark(surface: &mut PixelSurface, x: f32) {
        surface.stroke_segment(Point::new(x, 2.0), Point::new(x, 12.0), Color::BLACK, 1);
    }

    #[test]
    fn bounded() {
        let mut surface = blank();
        let mut history = History::new();
        history.reset(&surface);
        for i in 0..45 {
            mark(&mut surface, (i % 30) as f32);
            history.snapshot(&surface);
        }
        assert_eq!(history.len(), MAX_HISTORY);
        let mut undos = 0;
        while history.undo(&mut surface, Color::WHITE) {
            undos += 1;
        }
        assert_eq!(undos, MAX_HISTORY - 1);
        assert_eq!(history.len(), 1);
        assert!(!history.undo(&mut surface, Color::WHITE));
    }
    #[test]
    fn undo_restores_previous() {
        let mut surface = blank();
        let mut history = History::new();
        history.reset(&surface);

        mark(&mut surface, 4.0);
        history.snapshot(&surface);
        let after_first = surface.read_all().unwrap();

        mark(&mut surface, 20.0);
        history.snapshot(&surface);
        assert_ne!(surface.read_all().unwrap(), after_first);

        assert!(history.undo(&mut surface, Color::WHITE));
        assert_eq!(surface.read_all().unwrap(), after_first);
        assert!(history.undo(&mut surface, Color::WHITE));
        assert!(surface.is_blank(Color::WHITE));
    }
    #[test]
    fn baseline_never_popped() {
        let mut surface = blank();
        let mut history = History::new();
        assert!(!history.undo(&mut surface, Color::WHITE));
        history.reset(&surface);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.undo(&mut surface, Color::WHITE));
        assert_eq!(history.len(), 1);
    }
    #[test]
    fn zero_area_snapshot_is_skipped() {
        let surface = PixelSurface::default();
        let mut history = History::new();
        history.snapshot(&surface);
        assert!(history.is_empty());
        history.reset(&surface);
        assert!(history.is_empty());
    }
    #[test]
    fn reset_discards() {
        let mut surface = blank();
        let mut history = History::new();
        history.reset(&surface);
        mark(&mut surface, 3.0);
        history.snapshot(&surface);
        history.reset(&surface);
        assert_eq!(history.len(), 1);
        assert!(!history.undo(&mut surface, Color::WHITE));
    }
    #[test]
    fn undo_across_size_change() {
        let mut surface = PixelSurface::new(8, 8);
        surface.fill_background(Color::BLACK);
        let mut history = History::new();
        history.reset(&surface);
        // Simulate a resize: bigger surface with the old content.
        surface = PixelSurface::new(16, 16);
        surface.fill_background(Color::rgb(255, 0, 0));
        history.snapshot(&surface);

        assert!(history.undo(&mut surface, Color::WHITE));
        assert_eq!(surface.pixel(2, 2), Some(Color::BLACK));
        assert_eq!(surface.pixel(12, 12), Some(Color::WHITE));
    }
    #[test]
    #[should_panic(expected = "baseline")]
    fn zero_capacity() {
        let _ = History::with_capacity(0);
    }
}
