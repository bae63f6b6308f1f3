//! Session state: loaded images, current selection and the pose shown for it.

use crate::error::{AppError, Result};
use crate::file_utils;
use crate::image_loader::ImageHandle;
use crate::pose::Pose;
use crate::render::RenderStats;
use image::RgbaImage;
use log::{debug, warn};
use std::path::PathBuf;

/// User-visible message for any inference failure.
pub const INFERENCE_FAILED_MESSAGE: &str = "Pose estimation failed";

/// Direction for navigation through images.
#[derive(Debug, Clone, Copy)]
enum Direction {
    Next,
    Previous,
}

/// A pending inference for the image at `index`.
///
/// Only the ticket from the most recent [`PoseSession::begin_inference`] may
/// update the session.
#[derive(Debug, Clone)]
pub struct InferenceTicket {
    pub generation: u64,
    pub index: usize,
    pub image: ImageHandle,
}

/// A pending decode of a new image list.
///
/// Only the ticket from the most recent [`PoseSession::begin_intake`] may
/// replace the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeTicket {
    generation: u64,
}

/// What happened to a finished inference.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Displayed,
    Failed,
    /// A newer request superseded this one; the result was dropped.
    Stale,
}

/// The rendered canvas for the current selection.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub index: usize,
    pub pixels: RgbaImage,
    pub stats: RenderStats,
}

/// Owns everything the window shows.
#[derive(Default)]
pub struct PoseSession {
    images: Vec<ImageHandle>,
    selected: Option<usize>,
    pose: Option<Pose>,
    loading: bool,
    error_message: Option<String>,
    canvas: Option<Canvas>,
    generation: u64,
    intake_generation: u64,
}

impl PoseSession {
    /// Creates a new empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a decode whose result will replace the image list.
    pub fn begin_intake(&mut self) -> IntakeTicket {
        self.intake_generation += 1;
        IntakeTicket {
            generation: self.intake_generation,
        }
    }

    /// Replaces the image list and starts inference on the first image.
    ///
    /// An empty list, or a list from a superseded intake, leaves the session untouched.
    pub fn replace_images(
        &mut self,
        intake: IntakeTicket,
        images: Vec<ImageHandle>,
    ) -> Option<InferenceTicket> {
        if intake.generation != self.intake_generation {
            warn!(
                "Dropping {} image(s) from superseded intake {} (current {})",
                images.len(),
                intake.generation,
                self.intake_generation
            );
            return None;
        }
        if images.is_empty() {
            warn!("No decodable images to replace the current list");
            return None;
        }

        debug!("Replacing image list with {} image(s)", images.len());
        self.images = images;
        self.canvas = None;
        self.select(0).ok()
    }

    /// Selects an image and starts inference for it.
    pub fn select(&mut self, index: usize) -> Result<InferenceTicket> {
        if index >= self.images.len() {
            return Err(AppError::NoSelection);
        }
        self.selected = Some(index);
        Ok(self.begin_inference(index))
    }

    fn navigate_to(&mut self, direction: Direction) -> Option<InferenceTicket> {
        if self.images.is_empty() {
            warn!("No images available for navigation");
            return None;
        }

        let current_index = self.selected?;
        let new_index = match direction {
            Direction::Next => {
                if current_index + 1 < self.images.len() {
                    current_index + 1
                } else {
                    warn!("No next image available");
                    return None;
                }
            }
            Direction::Previous => {
                if current_index > 0 {
                    current_index - 1
                } else {
                    warn!("No previous image available");
                    return None;
                }
            }
        };

        self.select(new_index).ok()
    }

    /// Selects the next image, if there is one.
    pub fn next_image(&mut self) -> Option<InferenceTicket> {
        self.navigate_to(Direction::Next)
    }

    /// Selects the previous image, if there is one.
    pub fn prev_image(&mut self) -> Option<InferenceTicket> {
        self.navigate_to(Direction::Previous)
    }

    fn begin_inference(&mut self, index: usize) -> InferenceTicket {
        self.generation += 1;
        self.loading = true;
        self.pose = None;
        self.canvas = None;
        self.error_message = None;

        InferenceTicket {
            generation: self.generation,
            index,
            image: self.images[index].clone(),
        }
    }

    /// Whether `ticket` is still the latest request for the selected image.
    pub fn is_current(&self, ticket: &InferenceTicket) -> bool {
        ticket.generation == self.generation && self.selected == Some(ticket.index)
    }

    /// Applies an inference result unless a newer request superseded it.
    pub fn complete_inference(
        &mut self,
        ticket: &InferenceTicket,
        result: Result<Pose>,
    ) -> Completion {
        if !self.is_current(ticket) {
            warn!(
                "Dropping stale pose for image {} (generation {}, current {})",
                ticket.index + 1,
                ticket.generation,
                self.generation
            );
            return Completion::Stale;
        }

        self.loading = false;
        match result {
            Ok(pose) => {
                self.pose = Some(pose);
                self.error_message = None;
                Completion::Displayed
            }
            Err(_) => {
                self.pose = None;
                self.canvas = None;
                self.error_message = Some(INFERENCE_FAILED_MESSAGE.to_string());
                Completion::Failed
            }
        }
    }

    /// Stores the rendered canvas if it still belongs to the current selection.
    pub fn set_canvas(&mut self, ticket: &InferenceTicket, canvas: Canvas) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.canvas = Some(canvas);
        true
    }

    /// Returns the export file name and the canvas to encode.
    pub fn export_target(&self) -> Result<(String, RgbaImage)> {
        let canvas = self.canvas.as_ref().ok_or(AppError::NoSelection)?;
        Ok((
            file_utils::export_file_name(canvas.index),
            canvas.pixels.clone(),
        ))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }
}

/// Files dropped onto the window, collected into one intake.
///
/// The window reports each dropped file separately.
#[derive(Debug, Default)]
pub struct DropBatch {
    paths: Vec<PathBuf>,
}

impl DropBatch {
    /// Adds a path; returns true when it starts a new batch.
    pub fn push(&mut self, path: PathBuf) -> bool {
        self.paths.push(path);
        self.paths.len() == 1
    }

    /// Takes the collected paths in drop order.
    pub fn take(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Keypoint;

    fn images(count: usize) -> Vec<ImageHandle> {
        (0..count)
            .map(|i| ImageHandle::new(format!("image-{}", i), RgbaImage::new(4, 4)))
            .collect()
    }

    fn pose(score: f32) -> Pose {
        Pose::from_keypoints(vec![Keypoint::new("nose", 1.0, 1.0, score)])
    }

    fn replace(session: &mut PoseSession, images: Vec<ImageHandle>) -> Option<InferenceTicket> {
        let intake = session.begin_intake();
        session.replace_images(intake, images)
    }

    fn canvas_for(ticket: &InferenceTicket) -> Canvas {
        Canvas {
            index: ticket.index,
            pixels: ticket.image.pixels().clone(),
            stats: RenderStats::default(),
        }
    }

    #[test]
    fn replacing_images_selects_first_and_starts_loading() {
        let mut session = PoseSession::new();
        let ticket = replace(&mut session, images(3)).unwrap();

        assert_eq!(ticket.index, 0);
        assert_eq!(ticket.image.source(), "image-0");
        assert_eq!(session.selected_index(), Some(0));
        assert!(session.is_loading());
        assert!(session.pose().is_none());
    }

    #[test]
    fn empty_replacement_keeps_previous_list() {
        let mut session = PoseSession::new();
        replace(&mut session, images(2));
        assert!(replace(&mut session, Vec::new()).is_none());
        assert_eq!(session.image_count(), 2);
    }

    #[test]
    fn loading_clears_on_success_and_sets_pose() {
        let mut session = PoseSession::new();
        let ticket = replace(&mut session, images(1)).unwrap();

        let completion = session.complete_inference(&ticket, Ok(pose(0.8)));

        assert_eq!(completion, Completion::Displayed);
        assert!(!session.is_loading());
        assert_eq!(session.pose(), Some(&pose(0.8)));
        assert!(session.error_message().is_none());
    }

    #[test]
    fn error_set_only_when_inference_fails() {
        let mut session = PoseSession::new();
        let ticket = replace(&mut session, images(2)).unwrap();

        let completion =
            session.complete_inference(&ticket, Err(AppError::Inference("boom".into())));
        assert_eq!(completion, Completion::Failed);
        assert!(!session.is_loading());
        assert_eq!(session.error_message(), Some(INFERENCE_FAILED_MESSAGE));

        let ticket = session.next_image().unwrap();
        assert!(session.error_message().is_none());
        session.complete_inference(&ticket, Ok(pose(0.9)));
        assert!(session.error_message().is_none());
    }

    #[test]
    fn stale_result_does_not_overwrite_newer_selection() {
        let mut session = PoseSession::new();
        let first = replace(&mut session, images(3)).unwrap();
        let third = session.select(2).unwrap();

        assert!(!session.is_current(&first));
        assert!(session.is_current(&third));
        assert_eq!(session.complete_inference(&first, Ok(pose(0.1))), Completion::Stale);
        assert!(session.is_loading());
        assert!(session.pose().is_none());
        assert!(!session.set_canvas(&first, canvas_for(&first)));

        assert_eq!(session.complete_inference(&third, Ok(pose(0.7))), Completion::Displayed);
        assert_eq!(session.selected_index(), Some(2));
        assert_eq!(session.pose(), Some(&pose(0.7)));
    }

    #[test]
    fn navigation_stops_at_ends() {
        let mut session = PoseSession::new();
        assert!(session.next_image().is_none());

        replace(&mut session, images(2));
        assert!(session.prev_image().is_none());
        assert_eq!(session.next_image().unwrap().index, 1);
        assert!(session.next_image().is_none());
        assert_eq!(session.prev_image().unwrap().index, 0);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut session = PoseSession::new();
        replace(&mut session, images(1));
        assert!(matches!(session.select(5), Err(AppError::NoSelection)));
        assert_eq!(session.selected_index(), Some(0));
    }

    #[test]
    fn export_uses_canvas_index() {
        let mut session = PoseSession::new();
        assert!(session.export_target().is_err());

        replace(&mut session, images(3));
        let ticket = session.select(1).unwrap();
        session.complete_inference(&ticket, Ok(pose(0.9)));
        assert!(session.set_canvas(&ticket, canvas_for(&ticket)));

        let (name, pixels) = session.export_target().unwrap();
        assert_eq!(name, "pose_estimation_2.png");
        assert_eq!(pixels.dimensions(), (4, 4));
    }

    #[test]
    fn older_intake_does_not_overwrite_newer_list() {
        let mut session = PoseSession::new();
        let older = session.begin_intake();
        let newer = session.begin_intake();

        let ticket = session.replace_images(newer, images(3)).unwrap();
        assert_eq!(ticket.image.source(), "image-0");

        let older_images = vec![ImageHandle::new("older-0", RgbaImage::new(4, 4))];
        assert!(session.replace_images(older, older_images).is_none());
        assert_eq!(session.image_count(), 3);
        assert_eq!(session.selected_index(), Some(0));
        assert!(session.is_current(&ticket));
    }

    #[test]
    fn dropped_files_form_one_list() {
        let mut batch = DropBatch::default();
        assert!(batch.push(PathBuf::from("a.png")));
        assert!(!batch.push(PathBuf::from("b.png")));
        assert!(!batch.push(PathBuf::from("c.png")));

        let paths = batch.take();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.png"),
                PathBuf::from("b.png"),
                PathBuf::from("c.png"),
            ]
        );
        assert!(batch.take().is_empty());
        assert!(batch.push(PathBuf::from("d.png")));

        let mut session = PoseSession::new();
        let dropped = paths
            .iter()
            .map(|p| ImageHandle::new(p.display().to_string(), RgbaImage::new(2, 2)))
            .collect();
        replace(&mut session, dropped);
        assert_eq!(session.image_count(), 3);
    }

    #[test]
    fn failure_after_display_clears_canvas() {
        let mut session = PoseSession::new();
        let first = replace(&mut session, images(2)).unwrap();
        session.complete_inference(&first, Ok(pose(0.9)));
        assert!(session.set_canvas(&first, canvas_for(&first)));
        assert!(session.export_target().is_ok());

        let second = session.select(1).unwrap();
        let completion =
            session.complete_inference(&second, Err(AppError::Inference("boom".into())));

        assert_eq!(completion, Completion::Failed);
        assert!(session.canvas().is_none());
        assert!(matches!(session.export_target(), Err(AppError::NoSelection)));
    }
}
