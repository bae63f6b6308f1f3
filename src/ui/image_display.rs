//! Image intake, inference and canvas display.
//!
//! Uses `rayon::spawn` for decoding, downloading, inference and rendering,
//! then `slint::invoke_from_event_loop` to update the session and UI from the
//! background thread.

use crate::image_loader::{self, ImageHandle};
use crate::render;
use crate::state::{AppState, Canvas, Completion, InferenceTicket, IntakeTicket};
use crate::ui::{set_displayed_image, sync_view};
use log::{debug, error, info};
use std::path::PathBuf;

/// Claims the next intake so that lists decoded for older selections are dropped.
fn begin_intake(state: &AppState) -> Option<IntakeTicket> {
    match state.session.lock() {
        Ok(mut session) => Some(session.begin_intake()),
        Err(e) => {
            error!("Session lock poisoned, cannot open images: {}", e);
            None
        }
    }
}

/// Decodes the selected files in the background, then replaces the image list
/// and starts inference on the first image.
///
/// Must be called on the UI thread.
pub fn load_and_display_images(ui: slint::Weak<crate::AppWindow>, state: AppState, paths: Vec<PathBuf>) {
    let Some(intake) = begin_intake(&state) else {
        return;
    };

    info!("Decoding {} selected file(s)", paths.len());
    rayon::spawn(move || {
        let images = image_loader::decode_all(&paths);
        let _ = slint::invoke_from_event_loop(move || replace_images(ui, state, intake, images));
    });
}

/// Downloads a single image URL in the background and shows it like a selected file.
///
/// Must be called on the UI thread.
pub fn load_and_display_remote(ui: slint::Weak<crate::AppWindow>, state: AppState, url: String) {
    let Some(intake) = begin_intake(&state) else {
        return;
    };

    info!("Fetching preloaded image {}", url);
    rayon::spawn(move || {
        let images = match image_loader::fetch_url(&url) {
            Ok(handle) => vec![handle],
            Err(e) => {
                error!("Failed to load preloaded image {}: {}", url, e);
                Vec::new()
            }
        };
        let _ = slint::invoke_from_event_loop(move || replace_images(ui, state, intake, images));
    });
}

fn replace_images(
    ui: slint::Weak<crate::AppWindow>,
    state: AppState,
    intake: IntakeTicket,
    images: Vec<ImageHandle>,
) {
    let ticket = match state.session.lock() {
        Ok(mut session) => session.replace_images(intake, images),
        Err(e) => {
            error!("Session lock poisoned, cannot replace images: {}", e);
            return;
        }
    };

    if let Some(ticket) = ticket {
        start_inference(ui, state, ticket);
    }
}

/// Shows the bare image, marks the view as loading and estimates the pose in the background.
///
/// Must be called on the UI thread.
pub fn start_inference(ui: slint::Weak<crate::AppWindow>, state: AppState, ticket: InferenceTicket) {
    if let Some(ui) = ui.upgrade() {
        set_displayed_image(&ui, image_loader::create_pixel_buffer(ticket.image.pixels()));
        match state.session.lock() {
            Ok(session) => sync_view(&ui, &session),
            Err(e) => error!("Session lock poisoned, cannot refresh view: {}", e),
        }
    }

    rayon::spawn(move || {
        let result = state.inference.estimate(&ticket.image);
        if let Err(e) = &result {
            error!("Pose estimation failed for {}: {}", ticket.image.source(), e);
        }

        // Skip rendering when a newer selection has already taken over.
        let current = state
            .session
            .lock()
            .map(|session| session.is_current(&ticket))
            .unwrap_or(false);
        if !current {
            debug!("Skipping render of superseded image {}", ticket.index + 1);
            return;
        }

        let (pixels, stats) = render::render_pose(ticket.image.pixels(), result.as_ref().ok());
        let buffer = image_loader::create_pixel_buffer(&pixels);

        let _ = slint::invoke_from_event_loop(move || {
            let Some(ui) = ui.upgrade() else {
                return;
            };
            let mut session = match state.session.lock() {
                Ok(session) => session,
                Err(e) => {
                    error!("Session lock poisoned, dropping pose result: {}", e);
                    return;
                }
            };

            match session.complete_inference(&ticket, result) {
                Completion::Stale => return,
                Completion::Displayed => {
                    session.set_canvas(
                        &ticket,
                        Canvas {
                            index: ticket.index,
                            pixels,
                            stats,
                        },
                    );
                    info!(
                        "Image {}: drew {} keypoint(s) and {} edge(s)",
                        ticket.index + 1,
                        stats.keypoints,
                        stats.edges
                    );
                    set_displayed_image(&ui, buffer);
                }
                Completion::Failed => {}
            }

            sync_view(&ui, &session);
        });
    });
}
