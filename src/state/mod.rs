//! State management for the pose viewer application.

use crate::config::ModelConfig;
use crate::services::InferenceService;
use std::sync::{Arc, Mutex};

pub mod session;

pub use session::{Canvas, Completion, DropBatch, InferenceTicket, IntakeTicket, PoseSession};

/// Application-wide state container.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<PoseSession>>,
    /// Loads the pose model once and runs every estimate against it.
    pub inference: InferenceService,
    /// Files dropped onto the window that are waiting to be opened together.
    pub drops: Arc<Mutex<DropBatch>>,
}

impl AppState {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(PoseSession::new())),
            inference: InferenceService::new(config),
            drops: Arc::new(Mutex::new(DropBatch::default())),
        }
    }
}
