use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::Error;

/// Extension the camera firmware gives every recorded segment.
pub const SEGMENT_EXT: &str = "mp4";

/// Inclusive `[begin, end]` wall-clock window used to select segments.
/// `begin > end` is legal and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.begin <= t && t <= self.end
    }
}

/// Decodes a segment's start time from its position in the tree: the
/// grandparent directory is the ISO date, the parent directory the hour,
/// the file stem the minute. Seconds are always zero; the firmware writes
/// one file per minute. Any deviation is a `MalformedSegmentPath`.
pub fn decode_segment_time(path: &Path) -> Result<NaiveDateTime, Error> {
    let malformed = |reason: &str| Error::MalformedSegmentPath {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| malformed("missing file stem"))?;
    let hour_dir = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .ok_or_else(|| malformed("missing hour directory"))?;
    let date_dir = path
        .parent()
        .and_then(|p| p.parent())
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .ok_or_else(|| malformed("missing date directory"))?;

    let date = NaiveDate::parse_from_str(date_dir, "%Y-%m-%d")
        .map_err(|_| malformed("date directory is not YYYY-MM-DD"))?;
    let hour: u32 = hour_dir
        .parse()
        .map_err(|_| malformed("hour directory is not an integer"))?;
    let minute: u32 = stem
        .parse()
        .map_err(|_| malformed("file stem is not an integer"))?;

    date.and_hms_opt(hour, minute, 0)
        .ok_or_else(|| malformed("hour or minute out of range"))
}

/// Walks `root` (following symlinks) and returns every segment whose decoded
/// time lies inside `window`, deduplicated by canonical path. The set
/// iterates in path order, which the fixed-width naming makes chronological.
pub fn enumerate_segments(root: &Path, window: &TimeWindow) -> Result<BTreeSet<PathBuf>, Error> {
    let mut matching = BTreeSet::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_segment_ext(path) {
            continue;
        }

        let decoded = decode_segment_time(path)?;
        if window.contains(decoded) {
            debug!("adding {}", path.display());
            matching.insert(path.canonicalize()?);
        }
    }

    info!("found {} segments", matching.len());
    Ok(matching)
}

fn has_segment_ext(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(SEGMENT_EXT))
        .unwrap_or(false)
}
