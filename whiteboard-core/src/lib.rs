//! # Whiteboard Core
//!
//! A freehand raster whiteboard: pen and eraser strokes, stamped text, bounded snapshot undo,
//! themes, and named drafts persisted to a key-value store.

pub mod color;
pub mod drafts;
pub mod history;
pub mod id;
pub mod notify;
pub mod resize;
pub mod session;
pub mod state;
pub mod storage;
pub mod stroke;
pub mod surface;
pub mod theme;
pub mod tools;

pub use color::Color;
pub use session::Session;
pub use state::WhiteboardState;
pub use theme::Theme;
