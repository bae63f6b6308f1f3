//! Image decoding into shared bitmap handles.

use crate::error::{AppError, Result};
use image::RgbaImage;
use log::{debug, warn};
use rayon::prelude::*;
use slint::{Image, Rgba8Pixel, SharedPixelBuffer};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A decoded RGBA bitmap. Clones share the pixel data.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    source: String,
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(source: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            source: source.into(),
            pixels: Arc::new(pixels),
        }
    }

    /// Path or URL the image was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Decodes an image file, guessing the format from its contents.
pub fn decode_file(path: &Path) -> Result<ImageHandle> {
    let start = std::time::Instant::now();
    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;

    debug!("Decoded {:?} in {:?}", path, start.elapsed());
    Ok(ImageHandle::new(path.display().to_string(), image.to_rgba8()))
}

/// Decodes an in-memory encoded image.
pub fn decode_bytes(source: &str, bytes: &[u8]) -> Result<ImageHandle> {
    let image = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    Ok(ImageHandle::new(source, image.to_rgba8()))
}

/// Downloads and decodes an image URL. Blocks, so call it off the UI thread.
pub fn fetch_url(url: &str) -> Result<ImageHandle> {
    let start = std::time::Instant::now();
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let bytes = response.bytes()?;

    debug!("Fetched {} ({} bytes) in {:?}", url, bytes.len(), start.elapsed());
    decode_bytes(url, &bytes).map_err(|e| match e {
        AppError::ImageLoad(msg) => AppError::ImageFetch(msg),
        other => other,
    })
}

/// Decodes every path in parallel, keeping selection order.
///
/// Files that fail to decode are logged and left out.
pub fn decode_all(paths: &[PathBuf]) -> Vec<ImageHandle> {
    paths
        .par_iter()
        .filter_map(|path| match decode_file(path) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                None
            }
        })
        .collect()
}

/// Copies a canvas into a pixel buffer that can cross to the UI thread.
pub fn create_pixel_buffer(canvas: &RgbaImage) -> SharedPixelBuffer<Rgba8Pixel> {
    SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
        canvas.as_raw(),
        canvas.width(),
        canvas.height(),
    )
}

/// Converts a pixel buffer to a Slint Image. Must run on the UI thread.
pub fn create_slint_image(buffer: SharedPixelBuffer<Rgba8Pixel>) -> Image {
    Image::from_rgba8(buffer)
}
