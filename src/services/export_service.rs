//! Service for writing the rendered canvas to disk as PNG.

use crate::error::{AppError, Result};
use crate::render;
use image::RgbaImage;
use log::info;
use std::path::Path;

/// Service for exporting canvases.
pub struct ExportService;

impl ExportService {
    /// Creates a new export service.
    pub fn new() -> Self {
        Self
    }

    /// Encodes the canvas as PNG and writes it to `path`.
    pub fn write_png(&self, path: &Path, canvas: &RgbaImage) -> Result<()> {
        let bytes = render::encode_png(canvas)?;
        std::fs::write(path, &bytes)
            .map_err(|e| AppError::Export(format!("{}: {}", path.display(), e)))?;

        info!("Exported {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_decodable_png() {
        let path = std::env::temp_dir().join(format!("pose-viewer-export-{}.png", std::process::id()));
        let canvas = RgbaImage::new(9, 4);

        ExportService::new().write_png(&path, &canvas).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (9, 4));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unwritable_path_is_an_export_error() {
        let path = std::env::temp_dir().join("pose-viewer-missing-dir").join("out.png");
        let result = ExportService::new().write_png(&path, &RgbaImage::new(1, 1));
        assert!(matches!(result, Err(AppError::Export(_))));
    }
}
