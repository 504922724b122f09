mod error;
mod manifest;
mod merge;
mod segments;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn, Level};

use error::Error;
use merge::{FfmpegMerger, Merge};
use segments::TimeWindow;

const DERIVED_NAME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const OUTPUT_EXT: &str = "mkv";

#[derive(Parser)]
#[command(
    name = "camstitch",
    version,
    about = "Extract a time window of camera video segments and merge them into one file (lossless remux)"
)]
struct Cli {
    /// Root of the camera's recording tree (…/<YYYY-MM-DD>/<HH>/<MM>.mp4)
    #[arg(short = 'd', long, value_parser = existing_dir)]
    source_dir: PathBuf,

    /// Directory the merged output is written to
    #[arg(short = 'o', long, value_parser = existing_dir)]
    out_dir: PathBuf,

    /// Output filename. Defaults to "<begin>-<end>.mkv"
    #[arg(short = 'n', long)]
    file_name: Option<String>,

    /// Increase verbosity. Can be used more than once
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Lower bound of the window, ISO 8601 (e.g. 2024-01-01T13:00)
    #[arg(short = 'b', long, value_parser = parse_datetime)]
    begin: NaiveDateTime,

    /// Upper bound of the window, ISO 8601. Defaults to now
    #[arg(short = 'e', long, value_parser = parse_datetime)]
    end: Option<NaiveDateTime>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(verbosity_level(cli.verbose))
        .with_target(false)
        .init();

    run(&cli, &FfmpegMerger::new())?;
    Ok(())
}

fn run(cli: &Cli, merger: &dyn Merge) -> Result<(), Error> {
    let window = TimeWindow {
        begin: cli.begin,
        end: cli.end.unwrap_or_else(|| Local::now().naive_local()),
    };

    let found = segments::enumerate_segments(&cli.source_dir, &window)?;
    if found.is_empty() {
        warn!("no segments inside the requested window, nothing to merge");
        return Ok(());
    }

    let manifest = manifest::write_manifest(&found)?;
    let out_path = cli.out_dir.join(output_name(cli.file_name.as_deref(), &window));

    info!(
        "beginning merge of {} segments into {}",
        found.len(),
        out_path.display()
    );
    let merged = merger.merge(manifest.path(), &out_path);

    // The manifest must not outlive the run. close() surfaces deletion
    // errors on this path; Drop covers every earlier exit.
    manifest.close()?;

    let outcome = merged?;
    if !outcome.success {
        error!("ffmpeg failed: {} {}", outcome.stderr, outcome.stdout);
        return Err(Error::MergeFailed {
            status: outcome.status_label(),
        });
    }

    info!("merge complete");
    Ok(())
}

fn output_name(file_name: Option<&str>, window: &TimeWindow) -> String {
    match file_name {
        Some(name) => name.to_string(),
        None => format!(
            "{}-{}.{}",
            window.begin.format(DERIVED_NAME_FORMAT),
            window.end.format(DERIVED_NAME_FORMAT),
            OUTPUT_EXT
        ),
    }
}

fn verbosity_level(count: u8) -> Level {
    match count {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

fn existing_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("{s} is not an existing directory"))
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("{s} is not an ISO 8601 datetime"))
}
