use crate::config::{EXPORT_FILE_PREFIX, SUPPORTED_IMAGE_EXTENSIONS};
use std::path::Path;

/// Returns true if the path has one of the supported image extensions.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext_str| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext_str.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Returns true if the startup source should be downloaded rather than opened.
pub fn is_remote_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// File name offered when exporting the canvas of the image at `index`.
pub fn export_file_name(index: usize) -> String {
    format!("{}_{}.png", EXPORT_FILE_PREFIX, index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_extensions_ignore_case() {
        assert!(is_supported_image(Path::new("a/b/person.JPG")));
        assert!(is_supported_image(Path::new("person.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }

    #[test]
    fn urls_are_detected_by_scheme() {
        assert!(is_remote_url("https://example.com/person.jpg"));
        assert!(is_remote_url("http://example.com/person.jpg"));
        assert!(!is_remote_url("/home/user/http.jpg"));
    }

    #[test]
    fn export_names_are_one_based() {
        assert_eq!(export_file_name(0), "pose_estimation_1.png");
        assert_eq!(export_file_name(4), "pose_estimation_5.png");
    }
}
