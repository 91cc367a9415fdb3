//! # holoframe
//!
//! Turn a video into a numbered sequence of tiny grayscale PNG frames for
//! in-world hologram playback.
//!
//! A run decodes the best video stream front to back, keeps every Nth frame
//! so the output approximates a target frame rate, converts each kept frame
//! to 8-bit grayscale, shrinks it to 64×48 and writes it as
//! `frame_000000.png`, `frame_000001.png`, … Decoding is done by FFmpeg via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next); resampling and PNG
//! encoding by [`image`](https://crates.io/crates/image).
//!
//! ## Quick Start
//!
//! ```no_run
//! use holoframe::ExtractOptions;
//!
//! let report = holoframe::extract("bad_apple.mp4", "bad_apple_frames", &ExtractOptions::new())?;
//! println!("{} frames, every {} decoded frame(s)", report.saved_count, report.interval);
//! # Ok::<(), holoframe::HoloframeError>(())
//! ```
//!
//! ### Capped extraction at a lower rate
//!
//! ```no_run
//! use std::num::{NonZeroU32, NonZeroU64};
//!
//! use holoframe::ExtractOptions;
//!
//! let options = ExtractOptions::new()
//!     .with_target_fps(NonZeroU32::new(10).unwrap())
//!     .with_max_frames(NonZeroU64::new(100));
//! holoframe::extract("bad_apple.mp4", "preview", &options)?;
//! # Ok::<(), holoframe::HoloframeError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system.

pub mod configuration;
pub mod conversion;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod metadata;
pub mod progress;
pub mod sampling;
pub mod source;

pub use configuration::{
    DEFAULT_PROGRESS_BATCH, DEFAULT_TARGET_FPS, ExtractOptions, OUTPUT_HEIGHT, OUTPUT_WIDTH,
};
pub use conversion::{ResizeFilter, downsample};
pub use error::HoloframeError;
pub use extractor::{ExtractionReport, StreamEnd, artifact_path, extract};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::SourceMetadata;
pub use progress::{LogProgress, ProgressCallback, ProgressInfo};
pub use sampling::SamplingInterval;
pub use source::{DecodedFrames, VideoSource};
