//! The frame extraction run.
//!
//! [`extract`] opens a source, walks its decoded frames, keeps every Nth one
//! (see [`SamplingInterval`]), turns each kept frame into a small grayscale
//! PNG and writes it as `frame_NNNNNN.png`. Output indices count written
//! frames, not decode positions, so a run always produces a gap-free
//! sequence starting at `000000`.
//!
//! Running out of frames is never an error: an empty video, a target rate
//! above the native rate, and a stream that stops decoding halfway all end
//! the run successfully. The [`StreamEnd`] in the report tells them apart.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{GrayImage, ImageFormat};

use crate::{
    configuration::ExtractOptions,
    conversion::{GrayConverter, downsample},
    error::HoloframeError,
    metadata::SourceMetadata,
    progress::ProgressTracker,
    sampling::SamplingInterval,
    source::VideoSource,
};

/// Why the decode loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The decoder ran out of frames.
    Exhausted,
    /// The configured frame cap was reached.
    FrameCap,
    /// Reading or decoding failed partway through. Treated like the end of
    /// the stream; frames written up to that point are kept.
    Truncated(String),
}

impl StreamEnd {
    /// Short machine-friendly label.
    pub fn label(&self) -> &'static str {
        match self {
            StreamEnd::Exhausted => "exhausted",
            StreamEnd::FrameCap => "frame_cap",
            StreamEnd::Truncated(_) => "truncated",
        }
    }
}

/// Outcome of a successful [`extract`] call.
#[derive(Debug, Clone)]
#[must_use]
pub struct ExtractionReport {
    /// Number of artifacts written, `frame_000000.png` up to
    /// `frame_{saved_count - 1}.png`.
    pub saved_count: u64,
    /// Number of frames decoded, kept or not.
    pub decoded_count: u64,
    /// Stride used to pick frames.
    pub interval: SamplingInterval,
    /// Metadata of the source.
    pub source: SourceMetadata,
    /// Directory the artifacts were written to.
    pub output_dir: PathBuf,
    /// Why decoding stopped.
    pub end: StreamEnd,
}

/// Path of the artifact with the given output index.
///
/// ```
/// use std::path::Path;
///
/// let path = holoframe::artifact_path(Path::new("frames"), 42);
/// assert_eq!(path, Path::new("frames").join("frame_000042.png"));
/// ```
pub fn artifact_path(output_dir: &Path, index: u64) -> PathBuf {
    output_dir.join(format!("frame_{index:06}.png"))
}

/// Extract a sampled, downscaled grayscale frame sequence from a video.
///
/// The source is opened before anything touches the file system, so a
/// failed open leaves `output_dir` as it was. The directory is created with
/// its parents if missing; existing files in it are left alone and same-named
/// artifacts are overwritten.
///
/// # Errors
///
/// - [`HoloframeError::SourceNotFound`], [`HoloframeError::FileOpen`] or
///   [`HoloframeError::NoVideoStream`] if the source cannot be used.
/// - [`HoloframeError::IoError`] / [`HoloframeError::ImageError`] if the
///   output directory or an artifact cannot be written.
///
/// A frame that fails to decode or convert after the open ends the run
/// early with [`StreamEnd::Truncated`]; it is not an error.
///
/// # Example
///
/// ```no_run
/// use holoframe::ExtractOptions;
///
/// let report = holoframe::extract("bad_apple.mp4", "frames", &ExtractOptions::new())?;
/// println!("wrote {} frames", report.saved_count);
/// # Ok::<(), holoframe::HoloframeError>(())
/// ```
pub fn extract<P, Q>(
    video_path: P,
    output_dir: Q,
    options: &ExtractOptions,
) -> Result<ExtractionReport, HoloframeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let output_dir = output_dir.as_ref();
    let mut source = VideoSource::open(video_path.as_ref())?;
    let metadata = source.metadata().clone();

    log::info!("Video: {}", source.path().display());
    log::info!("Total frames: {}", metadata.frame_count);
    log::info!("Video FPS: {}", metadata.frames_per_second);
    log::info!("Extracting at: {} FPS", options.target_fps);

    let interval = SamplingInterval::from_rates(metadata.frames_per_second, options.target_fps);
    log::debug!("Sampling interval: every {interval} frame(s)");

    let frames = source.frames()?;
    fs::create_dir_all(output_dir)?;

    let total = interval.expected_outputs(metadata.known_frame_count(), options.max_frames);
    let mut tracker = ProgressTracker::new(options.progress.clone(), total, options.batch_size);
    let mut converter = GrayConverter::new();

    let outcome = sample_frames(
        frames,
        |frame| converter.convert(frame),
        output_dir,
        options,
        interval,
        &mut tracker,
    )?;

    drop(source);
    tracker.finish();

    log::info!(
        "Extraction complete! Saved {} frames to {}",
        outcome.saved_count,
        output_dir.display()
    );

    Ok(ExtractionReport {
        saved_count: outcome.saved_count,
        decoded_count: outcome.decoded_count,
        interval,
        source: metadata,
        output_dir: output_dir.to_path_buf(),
        end: outcome.end,
    })
}

/// Counters of one pass over the decoded frames.
struct LoopOutcome {
    saved_count: u64,
    decoded_count: u64,
    end: StreamEnd,
}

/// Walk `frames`, writing every kept one to `output_dir`.
///
/// A frame that fails to decode or to convert ends the pass as
/// [`StreamEnd::Truncated`]. Only write failures are returned as errors.
fn sample_frames<F, I, C>(
    frames: I,
    mut to_gray: C,
    output_dir: &Path,
    options: &ExtractOptions,
    interval: SamplingInterval,
    tracker: &mut ProgressTracker,
) -> Result<LoopOutcome, HoloframeError>
where
    I: IntoIterator<Item = Result<F, HoloframeError>>,
    C: FnMut(&F) -> Result<GrayImage, HoloframeError>,
{
    let mut saved_count = 0_u64;
    let mut decoded_count = 0_u64;
    let mut end = StreamEnd::Exhausted;

    for decoded in frames {
        let frame = match decoded {
            Ok(frame) => frame,
            Err(error) => {
                log::warn!("Stopping at frame {decoded_count}: {error}");
                end = StreamEnd::Truncated(error.to_string());
                break;
            }
        };
        let position = decoded_count;
        decoded_count += 1;

        if !interval.keeps(position) {
            continue;
        }

        let gray = match to_gray(&frame) {
            Ok(gray) => gray,
            Err(error) => {
                log::warn!("Stopping at frame {position}: {error}");
                end = StreamEnd::Truncated(error.to_string());
                break;
            }
        };
        let small = downsample(&gray, options.width, options.height, options.resize_filter);
        small.save_with_format(artifact_path(output_dir, saved_count), ImageFormat::Png)?;
        saved_count += 1;
        tracker.advance(position);

        if options.max_frames.is_some_and(|cap| saved_count >= cap.get()) {
            end = StreamEnd::FrameCap;
            break;
        }
    }

    Ok(LoopOutcome {
        saved_count,
        decoded_count,
        end,
    })
}
