use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Error;

/// Writes the ffmpeg concat-demuxer list: one `file '<path>'` line per
/// segment in ascending path order, flushed before it is handed to the
/// merge step. The returned handle owns the file on disk; dropping it
/// removes the manifest on every exit path, not just the happy one.
pub fn write_manifest(segments: &BTreeSet<PathBuf>) -> Result<NamedTempFile, Error> {
    let mut manifest = NamedTempFile::new()?;
    for path in segments {
        writeln!(manifest, "file '{}'", path.display())?;
    }
    manifest.flush()?;
    debug!("wrote manifest {}", manifest.path().display());
    Ok(manifest)
}
