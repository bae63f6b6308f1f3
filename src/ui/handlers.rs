//! Event handlers for UI callbacks.
//!
//! Sets up all Logic callbacks (select_images, next_image, prev_image, export_image)
//! using the appropriate threading model for each operation type.

use crate::config::SUPPORTED_IMAGE_EXTENSIONS;
use crate::services::ExportService;
use crate::state::{AppState, InferenceTicket, PoseSession};
use crate::ui::image_display::{load_and_display_images, start_inference};
use log::{error, info, warn};
use rfd::AsyncFileDialog;
use slint::ComponentHandle;
use std::path::PathBuf;

/// Sets up all UI event handlers for the application.
///
/// Takes the UI handle and shared application state, then registers
/// callbacks for image selection, navigation, and export.
pub fn setup_handlers(ui: &crate::AppWindow, state: AppState) {
    // Image selection handler
    // Uses slint::spawn_local because AsyncFileDialog must run on the main thread
    ui.global::<crate::Logic>().on_select_images({
        let ui_handle = ui.as_weak();
        let state = state.clone();
        move || {
            let ui_handle = ui_handle.clone();
            let state = state.clone();
            let _ = slint::spawn_local(async move {
                let Some(files) = AsyncFileDialog::new()
                    .add_filter("Images", &SUPPORTED_IMAGE_EXTENSIONS)
                    .pick_files()
                    .await
                else {
                    info!("No files selected");
                    return;
                };

                let paths: Vec<PathBuf> = files.iter().map(|f| f.path().to_path_buf()).collect();
                if paths.is_empty() {
                    return;
                }

                // Decoding happens on rayon
                load_and_display_images(ui_handle, state, paths);
            });
        }
    });

    // Next image handler
    ui.global::<crate::Logic>().on_next_image({
        let ui_handle = ui.as_weak();
        let state = state.clone();
        move || navigate(ui_handle.clone(), state.clone(), PoseSession::next_image)
    });

    // Previous image handler
    ui.global::<crate::Logic>().on_prev_image({
        let ui_handle = ui.as_weak();
        let state = state.clone();
        move || navigate(ui_handle.clone(), state.clone(), PoseSession::prev_image)
    });

    // Export handler
    // Save dialog on the main thread, PNG encoding and writing on rayon
    ui.global::<crate::Logic>().on_export_image({
        let state = state.clone();
        move || {
            let target = match state.session.lock() {
                Ok(session) => session.export_target(),
                Err(e) => {
                    error!("Session lock poisoned, cannot export: {}", e);
                    return;
                }
            };
            let (file_name, canvas) = match target {
                Ok(target) => target,
                Err(e) => {
                    warn!("Nothing to export: {}", e);
                    return;
                }
            };

            let _ = slint::spawn_local(async move {
                let Some(file_handle) = AsyncFileDialog::new()
                    .set_file_name(&file_name)
                    .add_filter("PNG", &["png"])
                    .save_file()
                    .await
                else {
                    info!("Export of {} cancelled", file_name);
                    return;
                };

                let path = file_handle.path().to_path_buf();
                rayon::spawn(move || {
                    if let Err(e) = ExportService::new().write_png(&path, &canvas) {
                        error!("Failed to export {}: {}", file_name, e);
                    }
                });
            });
        }
    });
}

fn navigate(
    ui_handle: slint::Weak<crate::AppWindow>,
    state: AppState,
    step: fn(&mut PoseSession) -> Option<InferenceTicket>,
) {
    let ticket = match state.session.lock() {
        Ok(mut session) => step(&mut *session),
        Err(e) => {
            error!("Session lock poisoned, cannot navigate: {}", e);
            return;
        }
    };

    if let Some(ticket) = ticket {
        start_inference(ui_handle, state, ticket);
    }
}
