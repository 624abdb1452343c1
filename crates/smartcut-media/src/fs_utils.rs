//! Filesystem utilities for cross-device file operations.
//!
//! Job working directories and the outputs directory may sit on different
//! filesystems; a plain rename then fails with EXDEV.

use std::path::Path;
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Move a file from `src` to `dst`, handling cross-device moves.
///
/// Attempts a fast rename first; on EXDEV falls back to copying to a temp
/// file next to the destination and renaming it into place, which keeps the
/// destination update atomic on its own filesystem.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                "Cross-device rename detected, falling back to copy+delete: {} -> {}",
                src.display(),
                dst.display()
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Check if an IO error is EXDEV (cross-device link).
fn is_cross_device_error(e: &std::io::Error) -> bool {
    // EXDEV is error code 18 on Linux/macOS
    e.raw_os_error() == Some(18)
}

/// Copy file to destination (via temp file) then delete source.
async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let tmp_dst = dst.with_extension("tmp");

    fs::copy(src, &tmp_dst).await?;

    if let Err(e) = fs::rename(&tmp_dst, dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        return Err(MediaError::from(e));
    }

    // Source removal is best effort
    if let Err(e) = fs::remove_file(src).await {
        tracing::warn!(
            "Failed to remove source file after cross-device move: {}: {}",
            src.display(),
            e
        );
    }

    Ok(())
}
