use std::{
    num::{NonZeroU32, NonZeroU64},
    path::PathBuf,
    sync::Arc,
};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use holoframe::{
    DEFAULT_TARGET_FPS, ExtractOptions, ExtractionReport, FfmpegLogLevel, HoloframeError,
    ProgressCallback, ProgressInfo, StreamEnd,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  holoframe bad_apple.mp4 bad_apple_frames --fps 30\n  holoframe clip.mkv preview --fps 10 --max-frames 200 --progress\n  holoframe --completions zsh > _holoframe";

const PLUGIN_FRAMES_DIR: &str = "plugins/Hologram/bad_apple_frames/";

#[derive(Debug, Parser)]
#[command(
    name = "holoframe",
    version,
    about = "Extract 64x48 grayscale PNG frames from a video for hologram playback",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Path to the video file.
    #[arg(required_unless_present = "completions")]
    video_file: Option<PathBuf>,

    /// Output directory for frames.
    #[arg(default_value = "frames")]
    output_dir: PathBuf,

    /// Frames per second to extract.
    #[arg(long, default_value_t = DEFAULT_TARGET_FPS)]
    fps: NonZeroU32,

    /// Maximum number of frames to extract (0 means no limit).
    #[arg(long)]
    max_frames: Option<u64>,

    /// Show debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors.
    #[arg(short, long)]
    quiet: bool,

    /// Show a progress bar instead of periodic log lines.
    #[arg(long)]
    progress: bool,

    /// Print the extraction report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// FFmpeg's own log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, default_value_t = FfmpegLogLevel::Error)]
    ffmpeg_log_level: FfmpegLogLevel,

    /// Print a shell completion script and exit.
    #[arg(long, value_enum, exclusive = true)]
    completions: Option<Shell>,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }

    fn max_frames(&self) -> Option<NonZeroU64> {
        self.max_frames.and_then(NonZeroU64::new)
    }
}

fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            let level = match record.level() {
                log::Level::Error => "error:".red().bold(),
                log::Level::Warn => "warning:".yellow().bold(),
                log::Level::Info => "info:".green(),
                log::Level::Debug => "debug:".blue(),
                log::Level::Trace => "trace:".dimmed(),
            };
            out.finish(format_args!("{level} {message}"))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::no_length();
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        if info.finished {
            self.bar.finish_with_message("done");
        }
    }
}

fn report_json(video_file: &std::path::Path, report: &ExtractionReport) -> serde_json::Value {
    json!({
        "video": video_file.display().to_string(),
        "output_dir": report.output_dir.display().to_string(),
        "saved_count": report.saved_count,
        "decoded_count": report.decoded_count,
        "interval": report.interval.get(),
        "end": report.end.label(),
        "truncation_reason": match &report.end {
            StreamEnd::Truncated(reason) => Some(reason.as_str()),
            _ => None,
        },
        "source": {
            "width": report.source.width,
            "height": report.source.height,
            "fps": report.source.frames_per_second,
            "frame_count": report.source.frame_count,
            "codec": report.source.codec,
            "format": report.source.format,
            "duration_seconds": report.source.duration.as_secs_f64(),
        },
    })
}

fn print_next_steps() {
    println!();
    println!("{}", "Next steps:".bold());
    println!("1. Copy the extracted frames to: {PLUGIN_FRAMES_DIR}");
    println!("2. Restart your Minecraft server");
    println!("3. Use the music disc 13 item in-game");
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "holoframe", &mut std::io::stdout());
        return Ok(());
    }

    init_logger(cli.log_level())?;
    holoframe::set_ffmpeg_log_level(cli.ffmpeg_log_level);

    let video_file = cli.video_file.clone().ok_or("missing video file")?;
    if !video_file.exists() {
        return Err(HoloframeError::SourceNotFound(video_file).into());
    }

    let mut options = ExtractOptions::new()
        .with_target_fps(cli.fps)
        .with_max_frames(cli.max_frames());
    if cli.progress {
        options = options
            .with_progress(Arc::new(TerminalProgress::new()?))
            .with_batch_size(1);
    }

    let report = holoframe::extract(&video_file, &cli.output_dir, &options)?;

    if let StreamEnd::Truncated(reason) = &report.end {
        log::warn!("Video ended early after {} decoded frames: {reason}", report.decoded_count);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&video_file, &report))?);
        return Ok(());
    }

    println!(
        "{} {}",
        "success:".green().bold(),
        format!(
            "Saved {} frame(s) to {}",
            report.saved_count,
            report.output_dir.display()
        )
        .green()
    );
    if !cli.quiet {
        print_next_steps();
    }

    Ok(())
}

fn main() {
    if let Err(error) = run(Cli::parse()) {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, time::Duration};

    use holoframe::{SamplingInterval, SourceMetadata};

    use super::*;

    #[test]
    fn defaults_match_documented_usage() {
        let cli = Cli::try_parse_from(["holoframe", "bad_apple.mp4"]).unwrap();
        assert_eq!(cli.video_file.as_deref(), Some(Path::new("bad_apple.mp4")));
        assert_eq!(cli.output_dir, PathBuf::from("frames"));
        assert_eq!(cli.fps.get(), 30);
        assert_eq!(cli.max_frames(), None);
        assert_eq!(cli.ffmpeg_log_level, FfmpegLogLevel::Error);
        assert_eq!(cli.log_level(), LevelFilter::Info);
    }

    #[test]
    fn positional_output_and_flags() {
        let cli = Cli::try_parse_from([
            "holoframe",
            "clip.mkv",
            "out",
            "--fps",
            "12",
            "--max-frames",
            "500",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.fps.get(), 12);
        assert_eq!(cli.max_frames().map(NonZeroU64::get), Some(500));
        assert_eq!(cli.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn zero_max_frames_means_unbounded() {
        let cli = Cli::try_parse_from(["holoframe", "clip.mkv", "--max-frames", "0"]).unwrap();
        assert_eq!(cli.max_frames(), None);
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(Cli::try_parse_from(["holoframe", "clip.mkv", "--fps", "0"]).is_err());
    }

    #[test]
    fn video_file_is_required_without_completions() {
        assert!(Cli::try_parse_from(["holoframe"]).is_err());
        let cli = Cli::try_parse_from(["holoframe", "--completions", "bash"]).unwrap();
        assert_eq!(cli.completions, Some(Shell::Bash));
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["holoframe", "a.mp4", "-v", "-q"]).is_err());
    }

    #[test]
    fn json_report_fields() {
        let report = ExtractionReport {
            saved_count: 3,
            decoded_count: 6,
            interval: SamplingInterval::new(2),
            source: SourceMetadata {
                width: 480,
                height: 360,
                frames_per_second: 60.0,
                frame_count: 6,
                codec: "h264".to_string(),
                duration: Duration::from_millis(100),
                format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            },
            output_dir: PathBuf::from("frames"),
            end: StreamEnd::Truncated("corrupt packet".to_string()),
        };

        let value = report_json(Path::new("clip.mp4"), &report);
        assert_eq!(value["saved_count"], 3);
        assert_eq!(value["interval"], 2);
        assert_eq!(value["end"], "truncated");
        assert_eq!(value["truncation_reason"], "corrupt packet");
        assert_eq!(value["source"]["codec"], "h264");
    }
}
