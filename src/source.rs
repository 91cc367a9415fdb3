//! Opened video sources and sequential decoding.
//!
//! [`VideoSource`] owns the FFmpeg demuxer for one file. It is released when
//! dropped, so every exit path of an extraction after a successful open gives
//! the handle back exactly once.
//!
//! [`DecodedFrames`] walks the best video stream front to back, yielding
//! every decoded picture in decode order. It never seeks.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::{Parameters, context::Context as CodecContext},
    decoder::Video as VideoDecoder, format::context::Input, frame::Video as VideoFrame,
    media::Type,
};

use crate::{
    error::HoloframeError,
    metadata::{SourceMetadata, estimate_frame_count},
};

/// An opened video file.
///
/// # Example
///
/// ```no_run
/// use holoframe::VideoSource;
///
/// let mut source = VideoSource::open("bad_apple.mp4")?;
/// println!("{:.2} fps", source.metadata().frames_per_second);
/// let decoded = source.frames()?.filter_map(Result::ok).count();
/// println!("{decoded} frames");
/// # Ok::<(), holoframe::HoloframeError>(())
/// ```
pub struct VideoSource {
    input_context: Input,
    video_stream_index: usize,
    decoder: Option<VideoDecoder>,
    metadata: SourceMetadata,
    path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file and read its metadata.
    ///
    /// # Errors
    ///
    /// - [`HoloframeError::SourceNotFound`] if `path` does not exist.
    /// - [`HoloframeError::FileOpen`] if FFmpeg cannot open or probe it.
    /// - [`HoloframeError::NoVideoStream`] if it has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HoloframeError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(HoloframeError::SourceNotFound(path));
        }

        log::debug!("Opening video source: {}", path.display());

        ffmpeg_next::init().map_err(|error| HoloframeError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| HoloframeError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(HoloframeError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder = open_decoder(stream.parameters()).map_err(|error| {
            HoloframeError::FileOpen {
                path: path.clone(),
                reason: format!(
                    "Failed to create video decoder for stream {video_stream_index}: {error}"
                ),
            }
        })?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let frames_per_second = [stream.avg_frame_rate(), stream.rate()]
            .into_iter()
            .find(|rate| rate.numerator() > 0 && rate.denominator() > 0)
            .map_or(0.0, f64::from);

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = SourceMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count: estimate_frame_count(stream.frames(), duration, frames_per_second),
            codec,
            duration,
            format: input_context.format().name().to_string(),
        };

        log::debug!(
            "Stream {video_stream_index}: {}x{} {} @ {:.3} fps",
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.frames_per_second,
        );

        Ok(Self {
            input_context,
            video_stream_index,
            decoder: Some(decoder),
            metadata,
            path,
        })
    }

    /// Metadata read when the source was opened.
    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the video stream from the current position to the end.
    ///
    /// The first call reuses the decoder built by [`open`](Self::open);
    /// later calls build a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an FFmpeg error if a decoder cannot be built for the stream.
    pub fn frames(&mut self) -> Result<DecodedFrames<'_>, HoloframeError> {
        let decoder = match self.decoder.take() {
            Some(decoder) => decoder,
            None => {
                let stream = self
                    .input_context
                    .stream(self.video_stream_index)
                    .ok_or(HoloframeError::NoVideoStream)?;
                open_decoder(stream.parameters())?
            }
        };

        Ok(DecodedFrames {
            input_context: &mut self.input_context,
            decoder,
            video_stream_index: self.video_stream_index,
            eof_sent: false,
            done: false,
        })
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        log::debug!("Releasing video source: {}", self.path.display());
    }
}

fn open_decoder(parameters: Parameters) -> Result<VideoDecoder, FfmpegError> {
    CodecContext::from_parameters(parameters)?
        .decoder()
        .video()
}

/// Pull iterator over every decoded frame of a [`VideoSource`].
///
/// Yields `Ok(frame)` per decoded picture. A read or decode failure, whether
/// it surfaces while sending a packet or while receiving a frame, is yielded
/// once as `Err` and ends the iteration. The end of the input ends it with
/// `None` after the decoder has been drained.
pub struct DecodedFrames<'a> {
    input_context: &'a mut Input,
    decoder: VideoDecoder,
    video_stream_index: usize,
    eof_sent: bool,
    done: bool,
}

impl DecodedFrames<'_> {
    fn fail(&mut self, error: HoloframeError) -> Option<Result<VideoFrame, HoloframeError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for DecodedFrames<'_> {
    type Item = Result<VideoFrame, HoloframeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let mut frame = VideoFrame::empty();
            match self.decoder.receive_frame(&mut frame) {
                Ok(()) => return Some(Ok(frame)),
                Err(FfmpegError::Other {
                    errno: libc::EAGAIN,
                }) => {}
                Err(FfmpegError::Eof) => {
                    self.done = true;
                    return None;
                }
                Err(error) => {
                    return self.fail(HoloframeError::VideoDecodeError(error.to_string()));
                }
            }

            // Drained decoders answer Eof; EAGAIN here means nothing more is coming.
            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut *self.input_context) {
                Ok(()) => {
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        return self.fail(HoloframeError::VideoDecodeError(error.to_string()));
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        return self.fail(HoloframeError::from(error));
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    return self.fail(HoloframeError::VideoDecodeError(format!(
                        "failed to read packet: {error}"
                    )));
                }
            }
        }
    }
}
