//! Pretrained pose network adapter.
//!
//! The network is a PoseNet-style ONNX graph taking an NHWC image in `[-1, 1]` and
//! producing a keypoint heatmap head and an offset head. Only single-pose decoding is
//! performed: the strongest heatmap cell per part wins.

use super::{Keypoint, NUM_KEYPOINTS, PART_NAMES, Pose};
use crate::config::ModelConfig;
use crate::error::{AppError, Result};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use log::{debug, info};
use std::fmt;
use std::path::Path;
use tract_onnx::prelude::tract_ndarray::{Array4, ArrayView3, Axis, Ix4};
use tract_onnx::prelude::*;

type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Something that can estimate one subject's pose in an image.
pub trait PoseModel: Send + Sync {
    fn estimate_single_pose(&self, image: &RgbaImage) -> Result<Pose>;
}

/// A loaded and optimized pose network.
pub struct PoseNet {
    plan: Model,
    config: ModelConfig,
    input_side: usize,
}

impl PoseNet {
    /// Loads the network at `config.model_path` with a fixed square input shape.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let start = std::time::Instant::now();
        let input_side = config.valid_input_resolution() as usize;
        let model_load = |e| model_load_error(&config.model_path, e);

        let graph = tract_onnx::onnx()
            .model_for_path(&config.model_path)
            .map_err(model_load)?
            .with_input_fact(0, f32::fact([1, input_side, input_side, 3]).into())
            .map_err(model_load)?
            .into_optimized()
            .map_err(model_load)?;
        let plan = SimplePlan::new(graph).map_err(model_load)?;

        info!(
            "Loaded pose model {:?} ({}x{} input) in {:?}",
            config.model_path,
            input_side,
            input_side,
            start.elapsed()
        );

        Ok(Self {
            plan,
            config: config.clone(),
            input_side,
        })
    }

    /// Resizes and normalizes the image into the network's input tensor.
    fn input_tensor(&self, image: &RgbaImage) -> Tensor {
        let side = self.input_side as u32;
        let resized = imageops::resize(image, side, side, FilterType::Triangle);
        Array4::from_shape_fn((1, self.input_side, self.input_side, 3), |(_, y, x, c)| {
            resized.get_pixel(x as u32, y as u32)[c] as f32 / 127.5 - 1.0
        })
        .into()
    }

    fn output_head<'a>(outputs: &'a TVec<TValue>, index: usize) -> Result<ArrayView3<'a, f32>> {
        let tensor = outputs
            .get(index)
            .ok_or_else(|| AppError::Inference(format!("model has no output #{}", index)))?;
        let view = tensor
            .to_array_view::<f32>()
            .map_err(|e| AppError::Inference(format!("output #{}: {:#}", index, e)))?
            .into_dimensionality::<Ix4>()
            .map_err(|e| AppError::Inference(format!("output #{}: {}", index, e)))?;
        Ok(view.index_axis_move(Axis(0), 0))
    }
}

impl PoseModel for PoseNet {
    fn estimate_single_pose(&self, image: &RgbaImage) -> Result<Pose> {
        let start = std::time::Instant::now();
        let input = self.input_tensor(image);
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| AppError::Inference(format!("{:#}", e)))?;

        let heatmaps = Self::output_head(&outputs, self.config.heatmap_output)?;
        let offsets = Self::output_head(&outputs, self.config.offset_output)?;
        let pose = decode_single_pose(
            heatmaps,
            offsets,
            self.config.output_stride,
            self.config.heatmaps_are_logits,
        )?;

        let side = self.input_side as f32;
        let pose = pose.scaled(image.width() as f32 / side, image.height() as f32 / side);
        debug!(
            "Estimated pose (score {:.3}) in {:?}",
            pose.score,
            start.elapsed()
        );
        Ok(pose)
    }
}

fn model_load_error(path: &Path, e: impl fmt::Display) -> AppError {
    AppError::ModelLoad(format!("{}: {:#}", path.display(), e))
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Decodes one pose from `[h, w, parts]` heatmaps and `[h, w, 2 * parts]` offsets.
///
/// Offsets hold the y components in the first half of the channels and x in the
/// second. Positions are in network input pixels.
pub fn decode_single_pose(
    heatmaps: ArrayView3<'_, f32>,
    offsets: ArrayView3<'_, f32>,
    output_stride: u32,
    heatmaps_are_logits: bool,
) -> Result<Pose> {
    let (height, width, parts) = heatmaps.dim();
    if parts != NUM_KEYPOINTS || height == 0 || width == 0 {
        return Err(AppError::Inference(format!(
            "unexpected heatmap shape {:?}",
            heatmaps.dim()
        )));
    }
    if offsets.dim() != (height, width, 2 * parts) {
        return Err(AppError::Inference(format!(
            "offset shape {:?} does not match heatmap shape {:?}",
            offsets.dim(),
            heatmaps.dim()
        )));
    }

    let stride = output_stride as f32;
    let keypoints = PART_NAMES
        .iter()
        .enumerate()
        .map(|(part, &name)| {
            let channel = heatmaps.index_axis(Axis(2), part);
            let ((y, x), &raw) = channel
                .indexed_iter()
                .fold(None, |best: Option<((usize, usize), &f32)>, (idx, value)| {
                    match best {
                        Some((_, best_value)) if best_value >= value => best,
                        _ => Some((idx, value)),
                    }
                })
                .unwrap_or(((0, 0), &f32::NEG_INFINITY));

            let score = if heatmaps_are_logits { sigmoid(raw) } else { raw };
            let offset_y = offsets[[y, x, part]];
            let offset_x = offsets[[y, x, part + parts]];
            Keypoint::new(
                name,
                x as f32 * stride + offset_x,
                y as f32 * stride + offset_y,
                score,
            )
        })
        .collect();

    Ok(Pose::from_keypoints(keypoints))
}
