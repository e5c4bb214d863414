use std::path::Path;

pub mod app;
pub mod config;
pub mod error;
pub mod vision;

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Only `.jpg`, `.jpeg` and `.png` are sent to the API. The match ignores ASCII case,
/// so `UPPER.JPG` is accepted as well.
pub fn has_allowed_extension(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ALLOWED_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        None => false,
    }
}
