//! Application configuration constants and model settings.

use std::ffi::OsString;
use std::path::PathBuf;

/// Supported image file extensions for the file dialog and drag-and-drop.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Keypoints and skeleton edges are drawn only when their score exceeds this.
pub const MIN_KEYPOINT_CONFIDENCE: f32 = 0.5;

/// Prefix of exported files: `pose_estimation_<n>.png`.
pub const EXPORT_FILE_PREFIX: &str = "pose_estimation";

// Overlay styling
pub const KEYPOINT_RADIUS: i32 = 3;
pub const SKELETON_LINE_WIDTH: u32 = 2;
pub const OVERLAY_COLOR: [u8; 4] = [0, 255, 255, 255];

/// Drop events arriving within this window are opened as one image list.
pub const DROP_BATCH_DELAY_MS: u64 = 100;

/// Environment variable overriding the model path.
pub const MODEL_PATH_ENV: &str = "POSE_MODEL_PATH";
pub const DEFAULT_MODEL_PATH: &str = "models/posenet_mobilenet_v1.onnx";

const DEFAULT_INPUT_RESOLUTION: u32 = 513;
const DEFAULT_SCALE_FACTOR: f32 = 0.5;
const DEFAULT_OUTPUT_STRIDE: u32 = 16;

/// Parameters used to load and run the pose network.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub input_resolution: u32,
    pub scale_factor: f32,
    pub output_stride: u32,
    /// Index of the heatmap output (`[1, h, w, 17]`).
    pub heatmap_output: usize,
    /// Index of the offset output (`[1, h, w, 34]`).
    pub offset_output: usize,
    /// Apply a sigmoid to the heatmaps before reading scores.
    pub heatmaps_are_logits: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            input_resolution: DEFAULT_INPUT_RESOLUTION,
            scale_factor: DEFAULT_SCALE_FACTOR,
            output_stride: DEFAULT_OUTPUT_STRIDE,
            heatmap_output: 0,
            offset_output: 1,
            heatmaps_are_logits: true,
        }
    }
}

impl ModelConfig {
    /// Resolves the model path: `--model <path>` beats `POSE_MODEL_PATH` beats the default.
    pub fn from_env_and_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let env_path = std::env::var_os(MODEL_PATH_ENV);
        Self::resolve(args, env_path)
    }

    fn resolve<I>(args: I, env_path: Option<OsString>) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut args = args.into_iter();
        let mut arg_path = None;
        while let Some(arg) = args.next() {
            if arg == "--model" {
                if let Some(value) = args.next() {
                    arg_path = Some(PathBuf::from(value));
                }
            } else if let Some(value) = arg.to_str().and_then(|s| s.strip_prefix("--model=")) {
                arg_path = Some(PathBuf::from(value));
            }
        }

        let model_path = arg_path
            .or_else(|| env_path.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        Self {
            model_path,
            ..Self::default()
        }
    }

    /// Side length of the square network input.
    ///
    /// Scales the configured resolution and snaps it down so that
    /// `(side - 1)` is a multiple of the output stride.
    pub fn valid_input_resolution(&self) -> u32 {
        let scaled = (self.input_resolution as f32 * self.scale_factor) as u32;
        let even = scaled.saturating_sub(1);
        even - even % self.output_stride + 1
    }

    /// Side length of the heatmap grid produced for the network input.
    pub fn output_resolution(&self) -> u32 {
        (self.valid_input_resolution() - 1) / self.output_stride + 1
    }
}
