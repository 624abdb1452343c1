//! Ordered concatenation of extracted segments.
//!
//! Assembly is a strict barrier: it runs only after every segment of the
//! job extracted successfully. The concat demuxer re-stamps timestamps
//! contiguously across splice points, so the output has no gaps or
//! backward jumps where segments meet.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Containers that understand the `+faststart` mov flag.
const FASTSTART_EXTENSIONS: &[&str] = &["mp4", "mov", "m4a"];

/// Concatenate segment files, in order, into `output`.
///
/// All segments must share codec parameters (guaranteed by the extraction
/// mode decision); the concat itself is pure stream copy.
pub async fn assemble_segments(
    segments: &[PathBuf],
    output: impl AsRef<Path>,
    timeout_secs: u64,
) -> MediaResult<()> {
    let output = output.as_ref();

    if segments.is_empty() {
        return Err(MediaError::InvalidMedia(
            "No segments to assemble".to_string(),
        ));
    }

    for seg in segments {
        if !seg.exists() {
            return Err(MediaError::FileNotFound(seg.clone()));
        }
    }

    debug!(
        segments = segments.len(),
        output = %output.display(),
        "Assembling segments with concat demuxer"
    );

    // The list file lives next to the segments (the job working dir)
    let list_dir = segments[0]
        .parent()
        .ok_or_else(|| MediaError::InvalidMedia("Segment path has no parent".to_string()))?;
    let concat_list = list_dir.join("concat.txt");
    tokio::fs::write(&concat_list, concat_list_content(segments)).await?;

    let mut cmd = FfmpegCommand::new(&concat_list, output)
        .input_args(["-f", "concat", "-safe", "0"])
        .codec_copy();

    if has_faststart_container(output) {
        cmd = cmd.output_args(["-movflags", "+faststart"]);
    }

    FfmpegRunner::new()
        .with_timeout(timeout_secs)
        .run(&cmd)
        .await?;

    info!(
        segments = segments.len(),
        output = %output.display(),
        "Assembly complete"
    );

    Ok(())
}

/// Build the concat demuxer list file content.
///
/// Single quotes in paths are escaped the way the demuxer expects
/// (`'` ends the quoted string, `\'` inserts the quote, `'` reopens it).
fn concat_list_content(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|p| {
            let escaped = p.to_string_lossy().replace('\'', "'\\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

fn has_faststart_container(output: &Path) -> bool {
    output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| FASTSTART_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_content() {
        let segments = vec![
            PathBuf::from("/tmp/job/seg_0000.mp4"),
            PathBuf::from("/tmp/job/seg_0001.mp4"),
        ];
        let content = concat_list_content(&segments);
        assert_eq!(
            content,
            "file '/tmp/job/seg_0000.mp4'\nfile '/tmp/job/seg_0001.mp4'\n"
        );
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let segments = vec![PathBuf::from("/tmp/it's here/seg_0000.mp4")];
        let content = concat_list_content(&segments);
        assert_eq!(content, "file '/tmp/it'\\''s here/seg_0000.mp4'\n");
    }

    #[test]
    fn test_faststart_containers() {
        assert!(has_faststart_container(Path::new("out.mp4")));
        assert!(has_faststart_container(Path::new("out.MOV")));
        assert!(!has_faststart_container(Path::new("out.webm")));
        assert!(!has_faststart_container(Path::new("out")));
    }

    #[tokio::test]
    async fn test_empty_segments_rejected() {
        let err = assemble_segments(&[], "out.mp4", 60).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidMedia(_)));
    }

    #[tokio::test]
    async fn test_missing_segment_rejected() {
        let segments = vec![PathBuf::from("/nonexistent/seg_0000.mp4")];
        let err = assemble_segments(&segments, "out.mp4", 60)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
