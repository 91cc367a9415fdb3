//! Error types for the `holoframe` crate.
//!
//! [`HoloframeError`] is the single error type returned by every fallible
//! operation. Only a failure to find or open the source is fatal for an
//! extraction run; everything after a successful open that goes wrong in the
//! decoder is reported through [`StreamEnd`](crate::StreamEnd) instead.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `holoframe` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HoloframeError {
    /// The input path does not exist.
    #[error("Video file '{}' not found", .0.display())]
    SourceNotFound(PathBuf),

    /// The path exists but could not be opened as a media container.
    #[error("Could not open video file {}: {reason}", .path.display())]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container opened but carries no video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while creating the output directory or writing.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding an artifact.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl HoloframeError {
    /// Returns `true` when the error means the source itself is unusable,
    /// as opposed to a failure while writing output.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            HoloframeError::SourceNotFound(_)
                | HoloframeError::FileOpen { .. }
                | HoloframeError::NoVideoStream
        )
    }
}

impl From<FfmpegError> for HoloframeError {
    fn from(error: FfmpegError) -> Self {
        HoloframeError::FfmpegError(error.to_string())
    }
}
