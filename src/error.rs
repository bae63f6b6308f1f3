//! Unified error types for the pose viewer application.

use std::fmt;

/// Application-specific errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Error reading or decoding an image file
    ImageLoad(String),
    /// Error downloading a preloaded image URL
    ImageFetch(String),
    /// Error loading or optimizing the pose network
    ModelLoad(String),
    /// Error running the pose network or decoding its outputs
    Inference(String),
    /// Error encoding or writing the exported canvas
    Export(String),
    /// The requested image index does not exist
    NoSelection,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ImageLoad(msg) => write!(f, "Image load error: {}", msg),
            AppError::ImageFetch(msg) => write!(f, "Image fetch error: {}", msg),
            AppError::ModelLoad(msg) => write!(f, "Model load error: {}", msg),
            AppError::Inference(msg) => write!(f, "Inference error: {}", msg),
            AppError::Export(msg) => write!(f, "Export error: {}", msg),
            AppError::NoSelection => write!(f, "No image selected"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::ImageLoad(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::ImageLoad(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ImageFetch(err.to_string())
    }
}

/// Type alias for Results in this application.
pub type Result<T> = std::result::Result<T, AppError>;
