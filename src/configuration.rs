//! Extraction options.
//!
//! [`ExtractOptions`] is a builder carrying the sampling rate, the optional
//! frame cap, the output raster size and the progress callback into
//! [`extract`](crate::extract). A default-constructed value reproduces the
//! stock behavior: 30 fps, no cap, 64×48 bilinear, a log line every 100
//! frames.
//!
//! # Example
//!
//! ```no_run
//! use std::num::{NonZeroU32, NonZeroU64};
//!
//! use holoframe::ExtractOptions;
//!
//! let options = ExtractOptions::new()
//!     .with_target_fps(NonZeroU32::new(20).unwrap())
//!     .with_max_frames(NonZeroU64::new(500));
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    num::{NonZeroU32, NonZeroU64},
    sync::Arc,
};

use crate::{
    conversion::ResizeFilter,
    progress::{LogProgress, ProgressCallback},
};

/// Default sampling rate in frames per second.
pub const DEFAULT_TARGET_FPS: NonZeroU32 = match NonZeroU32::new(30) {
    Some(fps) => fps,
    None => unreachable!(),
};

/// Width of every written frame.
pub const OUTPUT_WIDTH: u32 = 64;

/// Height of every written frame.
pub const OUTPUT_HEIGHT: u32 = 48;

/// Kept frames between two progress reports.
pub const DEFAULT_PROGRESS_BATCH: u64 = 100;

/// Settings for one extraction run.
#[derive(Clone)]
#[must_use]
pub struct ExtractOptions {
    pub(crate) target_fps: NonZeroU32,
    pub(crate) max_frames: Option<NonZeroU64>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) resize_filter: ResizeFilter,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("target_fps", &self.target_fps)
            .field("max_frames", &self.max_frames)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("resize_filter", &self.resize_filter)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Options with default settings.
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            max_frames: None,
            width: OUTPUT_WIDTH,
            height: OUTPUT_HEIGHT,
            resize_filter: ResizeFilter::default(),
            progress: Arc::new(LogProgress),
            batch_size: DEFAULT_PROGRESS_BATCH,
        }
    }

    /// Set the desired output rate.
    ///
    /// A rate above the source's own keeps every decoded frame.
    pub fn with_target_fps(mut self, fps: NonZeroU32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Stop after this many frames have been written. `None` is unbounded.
    pub fn with_max_frames(mut self, max_frames: Option<NonZeroU64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Set the output raster size. Zero dimensions are clamped to 1.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    /// Set the filter used to shrink frames.
    pub fn with_resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Replace the progress callback.
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Report progress every `size` kept frames. Clamped to at least 1.
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured sampling rate.
    pub fn target_fps(&self) -> NonZeroU32 {
        self.target_fps
    }

    /// The configured frame cap.
    pub fn max_frames(&self) -> Option<NonZeroU64> {
        self.max_frames
    }

    /// The configured output size as `(width, height)`.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
