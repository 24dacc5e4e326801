//! Browser DOM layer for the poster editor.
//!
//! This crate maps the live DOM onto the engine's region model. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `cursor`: Selection API reads and writes in region units
//! - `dom_sync`: `BrowserSurface`, the `RegionSurface` over display elements
//! - `events`: pointer, keyboard and toolbar listeners driving the engine
//! - `logging`: tracing setup and the bug-report log buffer
//!
//! # Re-exports
//!
//! This crate re-exports `poster-editor-core` for convenience, so consumers
//! only need to depend on `poster-editor-browser`.

// Re-export core crate
pub use poster_editor_core;
pub use poster_editor_core::*;

pub mod cursor;
pub mod dom_sync;
pub mod events;
pub mod logging;

pub use cursor::{clear_native_selection, read_selection, restore_selection};
pub use dom_sync::{BrowserSurface, apply_chrome};
pub use events::{EditorEvents, SharedEngine, classify_target};
pub use logging::{LogCaptureLayer, clear_logs, get_logs, init_tracing};
