//! Pose data types shared by the inference adapter and the renderer.

pub mod model;
pub mod skeleton;

pub use model::{PoseModel, PoseNet};
pub use skeleton::adjacent_keypoints;

/// Body part names in the order the network emits them.
pub const PART_NAMES: [&str; 17] = [
    "nose",
    "leftEye",
    "rightEye",
    "leftEar",
    "rightEar",
    "leftShoulder",
    "rightShoulder",
    "leftElbow",
    "rightElbow",
    "leftWrist",
    "rightWrist",
    "leftHip",
    "rightHip",
    "leftKnee",
    "rightKnee",
    "leftAnkle",
    "rightAnkle",
];

pub const NUM_KEYPOINTS: usize = PART_NAMES.len();

/// Returns the part index for a name from [`PART_NAMES`].
pub fn part_index(name: &str) -> Option<usize> {
    PART_NAMES.iter().position(|part| *part == name)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A labeled point with a confidence score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Keypoint {
    pub part: &'static str,
    pub position: Position,
    pub score: f32,
}

impl Keypoint {
    pub fn new(part: &'static str, x: f32, y: f32, score: f32) -> Self {
        Self {
            part,
            position: Position { x, y },
            score,
        }
    }

    /// Whether the keypoint is confident enough to be drawn.
    pub fn exceeds(&self, min_confidence: f32) -> bool {
        self.score > min_confidence
    }
}

/// One subject's keypoints, in [`PART_NAMES`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
    pub score: f32,
}

impl Pose {
    /// Builds a pose whose score is the mean keypoint score.
    pub fn from_keypoints(keypoints: Vec<Keypoint>) -> Self {
        let score = if keypoints.is_empty() {
            0.0
        } else {
            keypoints.iter().map(|k| k.score).sum::<f32>() / keypoints.len() as f32
        };
        Self { keypoints, score }
    }

    /// Returns a copy with positions multiplied by the given factors.
    pub fn scaled(&self, scale_x: f32, scale_y: f32) -> Self {
        let keypoints = self
            .keypoints
            .iter()
            .map(|k| Keypoint::new(k.part, k.position.x * scale_x, k.position.y * scale_y, k.score))
            .collect();
        Self {
            keypoints,
            score: self.score,
        }
    }

    pub fn confident_keypoints(&self, min_confidence: f32) -> impl Iterator<Item = &Keypoint> {
        self.keypoints.iter().filter(move |k| k.exceeds(min_confidence))
    }

    pub fn keypoint(&self, part: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|k| k.part == part)
    }
}
