//! Frame sampling.
//!
//! Output frames are picked by a fixed stride over the decode order rather
//! than by timestamps: with a 60 fps source and a 30 fps target every second
//! decoded frame is kept. When the target rate is at or above the source
//! rate the stride collapses to 1 and every frame is kept.

use std::num::{NonZeroU32, NonZeroU64};

/// Stride, in decoded frames, between two kept frames. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplingInterval(NonZeroU64);

impl SamplingInterval {
    /// Keep every frame.
    pub const EVERY_FRAME: SamplingInterval = SamplingInterval(NonZeroU64::MIN);

    /// Build an interval from a raw stride, treating 0 as 1.
    pub fn new(stride: u64) -> Self {
        NonZeroU64::new(stride).map_or(Self::EVERY_FRAME, SamplingInterval)
    }

    /// `max(1, floor(native_fps / target_fps))`.
    ///
    /// A native rate that is unknown (zero, negative, NaN or infinite) gives
    /// [`EVERY_FRAME`](Self::EVERY_FRAME).
    pub fn from_rates(native_fps: f64, target_fps: NonZeroU32) -> Self {
        if !native_fps.is_finite() || native_fps <= 0.0 {
            return Self::EVERY_FRAME;
        }
        let ratio = (native_fps / f64::from(target_fps.get())).floor();
        Self::new(ratio as u64)
    }

    /// The stride as a plain integer.
    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Whether the frame at `decode_position` is kept.
    pub fn keeps(self, decode_position: u64) -> bool {
        decode_position % self.0.get() == 0
    }

    /// How many frames a source of `total_frames` decoded frames yields,
    /// capped by `max_frames`. `None` when the total is unknown and there is
    /// no cap to fall back on.
    pub fn expected_outputs(
        self,
        total_frames: Option<u64>,
        max_frames: Option<NonZeroU64>,
    ) -> Option<u64> {
        let from_source = total_frames.map(|total| total.div_ceil(self.0.get()));
        match (from_source, max_frames) {
            (Some(count), Some(cap)) => Some(count.min(cap.get())),
            (Some(count), None) => Some(count),
            (None, Some(cap)) => Some(cap.get()),
            (None, None) => None,
        }
    }
}

impl Default for SamplingInterval {
    fn default() -> Self {
        Self::EVERY_FRAME
    }
}

impl std::fmt::Display for SamplingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
