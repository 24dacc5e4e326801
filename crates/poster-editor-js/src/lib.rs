//! WASM bindings for the poster text styling editor.
//!
//! The host page renders the cards and the toolbar markup; `JsPosterEditor`
//! mounts styled content into them and owns every selection and styling
//! decision.

mod editor;
mod types;

pub use editor::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and the tracing subscriber.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    poster_editor_browser::init_tracing();
}
