//! # Whiteboard State
//!
//! The one owner of the surface and its history. Nothing else mutates either: every change comes
//! through an entry point here, and every entry point that needs a repaint performs it explicitly.
//!
//! Entry points are no-ops while the surface has no area (not laid out yet). Anything that
//! replaces or recolors the surface wholesale first force-completes a stroke in progress, so no
//! snapshot ever captures half a stroke.

use chrono::{DateTime, Utc};

use crate::{
    color::Color,
    drafts::{
        self,
        load::{LoadId, LoadOutcome, LoadedDraft, PendingLoad},
        DownloadFile, DraftError, DraftGateway, SaveOutcome, SavedDraft,
    },
    history::History,
    resize::resize_preserving,
    storage::KeyValueStore,
    stroke::{PointerButton, StrokeRenderer, TextInsertion},
    surface::{PixelSurface, Point},
    theme::Theme,
    tools::{Tool, ToolState},
};

pub struct WhiteboardState {
    surface: PixelSurface,
    tools: ToolState,
    stroke: StrokeRenderer,
    text: TextInsertion,
    history: History,
    /// Latest requested draft load. Only its completion is applied.
    pending_load: Option<LoadId>,
}
impl Default for WhiteboardState {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}
impl WhiteboardState {
    /// A state with no surface yet. Call [`Self::resize`] once the drawing area is known.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            surface: PixelSurface::default(),
            tools: ToolState::new(theme),
            stroke: StrokeRenderer::new(),
            text: TextInsertion::default(),
            history: History::new(),
            pending_load: None,
        }
    }
    /// A blank `width`x`height` whiteboard, with history holding just that blank state.
    #[must_use]
    pub fn with_size(width: u32, height: u32, theme: Theme) -> Self {
        let mut state = Self::new(theme);
        state.resize(width, height);
        state
    }
    #[must_use]
    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }
    #[must_use]
    pub fn tools(&self) -> &ToolState {
        &self.tools
    }
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.tools.theme()
    }
    #[must_use]
    pub fn background(&self) -> Color {
        self.tools.background()
    }
    #[must_use]
    pub fn text_insertion(&self) -> &TextInsertion {
        &self.text
    }
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.stroke.is_drawing()
    }
    #[must_use]
    pub fn is_load_pending(&self) -> bool {
        self.pending_load.is_some()
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.tools.select_tool(tool);
    }
    pub fn set_pen_width(&mut self, width: u32) {
        self.tools.set_pen_width(width);
    }
    pub fn set_pen_color(&mut self, color: Option<Color>) {
        self.tools.set_pen_color(color);
    }

    /// Primary begins a stroke, secondary opens the text box. Ignored while a draft is loading.
    pub fn pointer_down(&mut self, at: Point, button: PointerButton) {
        match button {
            PointerButton::Secondary => self.context_menu(at),
            PointerButton::Auxiliary => (),
            PointerButton::Primary => {
                if !self.surface.is_initialized() || self.pending_load.is_some() {
                    return;
                }
                // Clicking away from an open text box commits it.
                if self.text.is_open() {
                    self.text_blur();
                }
                let params = self.tools.effective_stroke_params();
                self.stroke
                    .pointer_down(&mut self.surface, at, button, params);
            }
        }
    }
    pub fn pointer_move(&mut self, to: Point) {
        self.stroke.pointer_move(&mut self.surface, to);
    }
    /// Commit the stroke in progress, if any.
    pub fn pointer_up(&mut self) {
        self.finish_stroke();
    }
    pub fn pointer_leave(&mut self) {
        self.finish_stroke();
    }
    /// Flush any stroke in progress, then open the text box at `at`.
    pub fn context_menu(&mut self, at: Point) {
        self.finish_stroke();
        if !self.surface.is_initialized() {
            return;
        }
        self.text.open(at);
    }

    pub fn text_input(&mut self, text: &str) {
        self.text.set_input(text);
    }
    /// Draw the pending text, if any, and snapshot. Returns whether anything was drawn.
    pub fn text_confirm(&mut self) -> bool {
        let committed = self.text.confirm();
        self.draw_committed_text(committed)
    }
    /// Focus left the text box. Non-empty input is kept, as with confirm.
    pub fn text_blur(&mut self) -> bool {
        let committed = self.text.blur();
        self.draw_committed_text(committed)
    }
    /// Discard the pending text without touching the surface or history.
    pub fn text_cancel(&mut self) {
        self.text.cancel();
    }

    /// Revert the last committed action. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        self.finish_stroke();
        let background = self.background();
        self.history.undo(&mut self.surface, background)
    }
    /// Paint over everything with the background. Undoable.
    pub fn clear_canvas(&mut self) {
        self.finish_stroke();
        if !self.surface.is_initialized() {
            return;
        }
        self.surface.fill_background(self.background());
        self.history.snapshot(&self.surface);
    }

    /// Reallocate the surface at a new size, keeping existing content at the origin.
    ///
    /// The resized state is appended to history, so undo can step back across a resize. The
    /// first resize of an uninitialized surface establishes the history baseline instead.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.surface.dimensions() == (width, height) {
            return;
        }
        self.finish_stroke();
        if width == 0 || height == 0 {
            log::debug!("Surface collapsed to {width}x{height}");
            self.surface = PixelSurface::new(width, height);
            self.history.clear();
            self.text.cancel();
            return;
        }
        let was_initialized = self.surface.is_initialized();
        self.surface = resize_preserving(
            &self.surface,
            width,
            height,
            self.background(),
            self.tools.effective_stroke_params(),
        );
        if was_initialized {
            self.history.snapshot(&self.surface);
        } else {
            self.history.reset(&self.surface);
        }
    }

    /// Switch themes: recolor defaults, repaint the background, and restart history.
    ///
    /// Drawn content is cleared. Old snapshots would reference the old background, so history is
    /// reset to the freshly painted surface.
    pub fn apply_theme(&mut self, theme: Theme) {
        self.finish_stroke();
        self.tools.set_theme(theme);
        if !self.surface.is_initialized() {
            return;
        }
        self.surface.fill_background(self.background());
        self.surface
            .set_stroke_style(self.tools.effective_stroke_params());
        self.history.reset(&self.surface);
        log::debug!("Applied theme {theme}");
    }

    /// Save the surface through `gateway`.
    pub fn save_draft<Store: KeyValueStore>(
        &mut self,
        gateway: &mut DraftGateway<Store>,
        name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, DraftError> {
        self.finish_stroke();
        gateway.save(&self.surface, self.background(), name, now)
    }
    /// Render the surface as a PNG download.
    pub fn export_png(&mut self, now: DateTime<Utc>) -> Result<DownloadFile, DraftError> {
        self.finish_stroke();
        drafts::export_png(&self.surface, now)
    }
    /// Start decoding `draft`. Supersedes any load already in flight. Strokes can't start until
    /// the returned load has been handed back to [`Self::finish_load`].
    pub fn begin_load(&mut self, draft: SavedDraft) -> PendingLoad {
        self.finish_stroke();
        let id = LoadId::next();
        if let Some(previous) = self.pending_load.replace(id) {
            log::debug!("Load {previous} superseded by {id}");
        }
        PendingLoad::spawn(id, draft)
    }
    /// Abandon a load before it completes, releasing the hold on strokes if it was the latest.
    /// Returns whether it was.
    pub fn cancel_load(&mut self, pending: PendingLoad) -> bool {
        let id = pending.id();
        if self.pending_load != Some(id) {
            return false;
        }
        self.pending_load = None;
        log::debug!("Cancelled load {id}");
        true
    }
    /// Apply a completed load, if it's still the latest one requested.
    ///
    /// On success the surface shows exactly the draft (scaled to fit) and history restarts from it.
    /// A failed decode leaves the surface untouched, as does a surface that lost its area while
    /// the decode was in flight.
    pub fn finish_load(&mut self, loaded: LoadedDraft) -> Result<LoadOutcome, DraftError> {
        if self.pending_load != Some(loaded.id) {
            log::debug!("Dropping superseded load {}", loaded.id);
            return Ok(LoadOutcome::Superseded);
        }
        self.pending_load = None;
        let image = loaded.image?;
        if !self.surface.is_initialized() {
            log::warn!(
                "Discarding draft {:?}, the surface has no area",
                loaded.draft.name
            );
            return Ok(LoadOutcome::Discarded(loaded.draft));
        }

        self.finish_stroke();
        self.surface.fill_background(self.background());
        self.surface.draw_image_scaled(&image);
        self.surface
            .set_stroke_style(self.tools.effective_stroke_params());
        self.history.reset(&self.surface);
        log::info!("Loaded draft {:?}", loaded.draft.name);
        Ok(LoadOutcome::Applied(loaded.draft))
    }

    fn finish_stroke(&mut self) {
        if self.stroke.pointer_up() {
            self.history.snapshot(&self.surface);
        }
    }
    fn draw_committed_text(&mut self, committed: Option<(Point, String)>) -> bool {
        let Some((at, text)) = committed else {
            return false;
        };
        if !self.surface.is_initialized() {
            return false;
        }
        let color = self.tools.pen_color();
        self.surface.draw_text(&text, at.x, at.y, color);
        self.history.snapshot(&self.surface);
        true
    }
}
