//! UI module for handling user interactions and UI updates.
//!
//! Threading model:
//! - `slint::spawn_local`: file dialogs, which must run on the main thread
//! - `rayon::spawn`: decoding, downloading, inference, rendering and PNG export
//! - `slint::invoke_from_event_loop`: hands rayon results back to the UI thread

pub mod handlers;
pub mod image_display;
mod state_helpers;

pub use handlers::setup_handlers;
pub use state_helpers::*;
