//! Progress reporting.
//!
//! Extraction reports progress every [`batch_size`](crate::ExtractOptions::with_batch_size)
//! kept frames through a [`ProgressCallback`]. Reports are purely
//! observational: a callback cannot stop or alter the run.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use holoframe::{ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         match info.percentage {
//!             Some(pct) => println!("{} frames ({pct:.1}%)", info.current),
//!             None => println!("{} frames", info.current),
//!         }
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! holoframe::extract("bad_apple.mp4", "frames", &options)?;
//! # Ok::<(), holoframe::HoloframeError>(())
//! ```

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// A snapshot of extraction progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Frames written so far.
    pub current: u64,
    /// Frames expected in total, if the source length (or a cap) is known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since extraction started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Decode position of the frame just written. `None` in the final report.
    pub decode_position: Option<u64>,
    /// `true` for the report emitted once extraction has ended.
    pub finished: bool,
}

/// Receives progress updates during extraction.
///
/// Implementations must be [`Send`] and [`Sync`] so one callback object can
/// be shared between several runs.
pub trait ProgressCallback: Send + Sync {
    /// Called every batch of kept frames, and once more at the end.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Default callback: an `info` log line per batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if !info.finished {
            log::info!("Extracted {} frames...", info.current);
        }
    }
}

/// Tracks timing and fires callbacks for one extraction run.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
        }
    }

    /// Record one written frame and report on every batch boundary.
    pub(crate) fn advance(&mut self, decode_position: u64) {
        self.current += 1;
        if self.current % self.batch_size == 0 {
            self.report(Some(decode_position), false);
        }
    }

    /// Emit the final report.
    pub(crate) fn finish(&mut self) {
        self.report(None, true);
    }

    fn report(&self, decode_position: Option<u64>, finished: bool) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32 * 100.0).min(100.0));

        let estimated_remaining = match self.total {
            Some(total) if self.current > 0 && !finished => {
                let remaining = total.saturating_sub(self.current);
                Some(elapsed.mul_f64(remaining as f64 / self.current as f64))
            }
            _ => None,
        };

        self.callback.on_progress(&ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            decode_position,
            finished,
        });
    }
}
