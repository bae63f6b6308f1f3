//! Helper functions to set multiple ViewState properties in a grouped manner.
//!
//! Instead of calling individual setters like set_loading, set_current_index, etc.,
//! these functions group related properties together for better code organization and maintainability.

use crate::image_loader;
use crate::state::PoseSession;
use slint::{ComponentHandle, Rgba8Pixel, SharedPixelBuffer};

/// Shows a canvas in the image area.
pub fn set_displayed_image(ui: &crate::AppWindow, buffer: SharedPixelBuffer<Rgba8Pixel>) {
    let view_state = ui.global::<crate::ViewState>();
    view_state.set_dynamic_image(image_loader::create_slint_image(buffer));
    view_state.set_image_loaded(true);
}

/// Sets all navigation-related properties at once.
///
/// Groups: current-index, total-index
pub fn set_navigation_info(ui: &crate::AppWindow, current_index: i32, total_index: i32) {
    let view_state = ui.global::<crate::ViewState>();
    view_state.set_current_index(current_index);
    view_state.set_total_index(total_index);
}

/// Sets all inference-related properties at once.
///
/// Groups: loading, error-message, keypoint-count, pose-score
pub fn set_inference_info(
    ui: &crate::AppWindow,
    loading: bool,
    error_message: &str,
    keypoint_count: i32,
    pose_score: &str,
) {
    let view_state = ui.global::<crate::ViewState>();
    view_state.set_loading(loading);
    view_state.set_error_message(error_message.into());
    view_state.set_keypoint_count(keypoint_count);
    view_state.set_pose_score(pose_score.into());
}

/// Mirrors the session into the view.
pub fn sync_view(ui: &crate::AppWindow, session: &PoseSession) {
    let current = session.selected_index().map(|i| i as i32 + 1).unwrap_or(0);
    set_navigation_info(ui, current, session.image_count() as i32);

    let keypoint_count = session
        .canvas()
        .map(|canvas| canvas.stats.keypoints as i32)
        .unwrap_or(0);
    let pose_score = session
        .pose()
        .map(|pose| format!("{:.2}", pose.score))
        .unwrap_or_default();

    set_inference_info(
        ui,
        session.is_loading(),
        session.error_message().unwrap_or(""),
        keypoint_count,
        &pose_score,
    );
}
