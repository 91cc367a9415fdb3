//! Source metadata.
//!
//! [`SourceMetadata`] is read once when a [`VideoSource`](crate::VideoSource)
//! is opened. The values are informational: the frame rate feeds the
//! sampling interval, the frame count only feeds progress estimates.

use std::time::Duration;

/// Metadata for the video stream an extraction reads from.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct SourceMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Nominal frames per second. `0.0` when the container does not say.
    pub frames_per_second: f64,
    /// Best-effort total frame count. `0` when unknown.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Container duration. [`Duration::ZERO`] when unknown.
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl SourceMetadata {
    /// The frame count, if the container reported a usable one.
    pub fn known_frame_count(&self) -> Option<u64> {
        (self.frame_count > 0).then_some(self.frame_count)
    }
}

/// Pick the best frame count available.
///
/// Prefers the count stored in the stream header and falls back to
/// `duration × fps`. Returns `0` when neither is known.
pub(crate) fn estimate_frame_count(
    stream_frames: i64,
    duration: Duration,
    frames_per_second: f64,
) -> u64 {
    if stream_frames > 0 {
        return stream_frames as u64;
    }
    if frames_per_second > 0.0 && frames_per_second.is_finite() {
        (duration.as_secs_f64() * frames_per_second) as u64
    } else {
        0
    }
}
