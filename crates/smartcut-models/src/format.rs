//! Supported upload formats.

use std::path::Path;

/// File extensions accepted at the upload boundary.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "mp4", "wav", "m4a", "webm", "ogg", "flac", "avi", "mov",
];

/// Whether a path carries a supported media extension (case-insensitive).
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
