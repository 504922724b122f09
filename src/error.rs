use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("segment path {path:?} does not follow <YYYY-MM-DD>/<HH>/<MM>.mp4: {reason}")]
    MalformedSegmentPath { path: PathBuf, reason: String },

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("ffmpeg merge failed ({status})")]
    MergeFailed { status: String },
}
