use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What the external tool reported: exit status plus the captured
/// diagnostic streams. Streams are captured, not forwarded live.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl MergeOutcome {
    pub fn status_label(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Narrow seam around the external media tool so the logic wrapped around
/// it (error interpretation, manifest cleanup ordering) can be exercised
/// with a fake.
pub trait Merge {
    fn merge(&self, manifest: &Path, output: &Path) -> io::Result<MergeOutcome>;
}

/// Concatenates by manifest with stream copy: a container-level remux, no
/// re-encode. `-safe 0` because the manifest names absolute paths outside
/// its own directory; `-y` because a null stdin cannot answer the
/// overwrite prompt.
pub struct FfmpegMerger {
    program: PathBuf,
}

impl FfmpegMerger {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }

    #[cfg(test)]
    fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl Merge for FfmpegMerger {
    fn merge(&self, manifest: &Path, output: &Path) -> io::Result<MergeOutcome> {
        let captured = Command::new(&self.program)
            .arg("-hide_banner")
            .arg("-y")
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .arg(manifest)
            .arg("-c")
            .arg("copy")
            .arg(output)
            .output()?;

        Ok(MergeOutcome {
            success: captured.status.success(),
            exit_code: captured.status.code(),
            stdout: String::from_utf8_lossy(&captured.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&captured.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_captured_not_raised() {
        // `false` ignores the ffmpeg arguments and exits 1.
        let merger = FfmpegMerger::with_program("false");
        let outcome = merger
            .merge(Path::new("/nonexistent/manifest"), Path::new("/nonexistent/out.mkv"))
            .expect("invocation itself succeeds");

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(1));
        assert_eq!(outcome.status_label(), "exit code 1");
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_reports_success() {
        let merger = FfmpegMerger::with_program("true");
        let outcome = merger
            .merge(Path::new("/nonexistent/manifest"), Path::new("/nonexistent/out.mkv"))
            .expect("invocation itself succeeds");

        assert!(outcome.success);
        assert_eq!(outcome.exit_code, Some(0));
    }

    #[test]
    fn missing_program_surfaces_as_io_error() {
        let merger = FfmpegMerger::with_program("definitely-not-a-real-binary");
        assert!(merger
            .merge(Path::new("/nonexistent/manifest"), Path::new("/nonexistent/out.mkv"))
            .is_err());
    }
}
