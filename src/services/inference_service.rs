//! Service for running pose estimation against a lazily loaded model.
//!
//! The model is loaded on first use and shared by every later request. A failed
//! load is not remembered, so the next request tries again.

use crate::config::ModelConfig;
use crate::error::Result;
use crate::image_loader::ImageHandle;
use crate::pose::{Pose, PoseModel, PoseNet};
use log::{debug, info};
use once_cell::sync::OnceCell;
use std::sync::Arc;

type ModelLoader = dyn Fn(&ModelConfig) -> Result<Arc<dyn PoseModel>> + Send + Sync;

/// Service for estimating poses. Clones share the loaded model.
#[derive(Clone)]
pub struct InferenceService {
    config: Arc<ModelConfig>,
    model: Arc<OnceCell<Arc<dyn PoseModel>>>,
    loader: Arc<ModelLoader>,
}

impl InferenceService {
    /// Creates a service that loads the ONNX network described by `config`.
    pub fn new(config: ModelConfig) -> Self {
        Self::with_loader(config, |config| {
            let model: Arc<dyn PoseModel> = Arc::new(PoseNet::load(config)?);
            Ok(model)
        })
    }

    /// Creates a service with a custom model loader.
    pub fn with_loader<F>(config: ModelConfig, loader: F) -> Self
    where
        F: Fn(&ModelConfig) -> Result<Arc<dyn PoseModel>> + Send + Sync + 'static,
    {
        Self {
            config: Arc::new(config),
            model: Arc::new(OnceCell::new()),
            loader: Arc::new(loader),
        }
    }

    /// Returns the shared model, loading it if this is the first call.
    pub fn model(&self) -> Result<Arc<dyn PoseModel>> {
        self.model
            .get_or_try_init(|| {
                info!("Loading pose model from {:?}", self.config.model_path);
                (self.loader)(&self.config)
            })
            .cloned()
    }

    /// Estimates the pose of the single subject in `image`. Blocks.
    pub fn estimate(&self, image: &ImageHandle) -> Result<Pose> {
        let start = std::time::Instant::now();
        let pose = self.model()?.estimate_single_pose(image.pixels())?;
        debug!(
            "Pose for {} ({}x{}) ready in {:?}",
            image.source(),
            image.width(),
            image.height(),
            start.elapsed()
        );
        Ok(pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::pose::Keypoint;
    use image::RgbaImage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPose;

    impl PoseModel for FixedPose {
        fn estimate_single_pose(&self, image: &RgbaImage) -> Result<Pose> {
            Ok(Pose::from_keypoints(vec![Keypoint::new(
                "nose",
                image.width() as f32 / 2.0,
                image.height() as f32 / 2.0,
                0.9,
            )]))
        }
    }

    fn counting_service(fail_first: bool) -> (InferenceService, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let service = InferenceService::with_loader(ModelConfig::default(), move |_| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            if fail_first && attempt == 0 {
                return Err(AppError::ModelLoad("missing".into()));
            }
            let model: Arc<dyn PoseModel> = Arc::new(FixedPose);
            Ok(model)
        });
        (service, loads)
    }

    #[test]
    fn model_is_loaded_once() {
        let (service, loads) = counting_service(false);
        let image = ImageHandle::new("a", RgbaImage::new(10, 20));

        let first = service.estimate(&image).unwrap();
        let second = service.clone().estimate(&image).unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(first.keypoint("nose").unwrap().position.y, 10.0);
    }

    #[test]
    fn failed_load_is_retried() {
        let (service, loads) = counting_service(true);
        let image = ImageHandle::new("a", RgbaImage::new(2, 2));

        assert!(matches!(service.estimate(&image), Err(AppError::ModelLoad(_))));
        assert!(service.model.get().is_none());
        assert!(service.estimate(&image).is_ok());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert!(service.model.get().is_some());
    }
}
