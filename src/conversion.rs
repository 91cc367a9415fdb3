//! Frame conversion helpers.
//!
//! A kept frame goes through two steps: FFmpeg's software scaler turns the
//! decoded picture into 8-bit luma at its native resolution, then the
//! `image` crate resamples that raster down to the output size.

use ffmpeg_next::{
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{GrayImage, imageops::FilterType};

use crate::error::HoloframeError;

/// Resampling filter used to shrink grayscale frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    /// Nearest-neighbour: blocky, keeps hard edges.
    Nearest,
    /// Bilinear interpolation. This is the default.
    #[default]
    Bilinear,
}

impl ResizeFilter {
    fn to_filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
        }
    }
}

/// Converts decoded frames of one stream to grayscale images.
///
/// The scaler is created lazily from the first frame and rebuilt whenever
/// the decoded format or size changes mid-stream.
pub(crate) struct GrayConverter {
    scaler: Option<(ScalingContext, Pixel, u32, u32)>,
    gray_frame: VideoFrame,
}

impl GrayConverter {
    pub(crate) fn new() -> Self {
        Self {
            scaler: None,
            gray_frame: VideoFrame::empty(),
        }
    }

    /// Convert `frame` to an 8-bit grayscale image at its own resolution.
    pub(crate) fn convert(&mut self, frame: &VideoFrame) -> Result<GrayImage, HoloframeError> {
        let (format, width, height) = (frame.format(), frame.width(), frame.height());

        let stale = !matches!(
            &self.scaler,
            Some((_, f, w, h)) if *f == format && *w == width && *h == height
        );
        if stale {
            log::debug!("Building {format:?} {width}x{height} -> GRAY8 scaler");
            let context = ScalingContext::get(
                format,
                width,
                height,
                Pixel::GRAY8,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?;
            self.scaler = Some((context, format, width, height));
        }

        let Some((scaler, ..)) = self.scaler.as_mut() else {
            return Err(HoloframeError::VideoDecodeError(
                "grayscale scaler unavailable".to_string(),
            ));
        };
        scaler.run(frame, &mut self.gray_frame)?;

        let buffer = frame_to_buffer(&self.gray_frame, width, height, 1);
        GrayImage::from_raw(width, height, buffer).ok_or_else(|| {
            HoloframeError::VideoDecodeError(
                "Failed to construct grayscale image from decoded frame data".to_string(),
            )
        })
    }
}

/// Copy plane 0 of `video_frame` into a tightly packed buffer.
///
/// `bytes_per_pixel` is 1 for GRAY8, 3 for RGB24 and so on. Row padding
/// (`stride > width * bytes_per_pixel`) is dropped.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    pack_rows(
        video_frame.data(0),
        video_frame.stride(0),
        width as usize * bytes_per_pixel,
        height as usize,
    )
}

fn pack_rows(data: &[u8], stride: usize, row_bytes: usize, rows: usize) -> Vec<u8> {
    if stride == row_bytes {
        return data[..row_bytes * rows].to_vec();
    }
    let mut buffer = Vec::with_capacity(row_bytes * rows);
    for row in data.chunks(stride).take(rows) {
        buffer.extend_from_slice(&row[..row_bytes]);
    }
    buffer
}

/// Resample `image` to exactly `width × height`.
///
/// Returns a copy unchanged when the image already has the target size.
pub fn downsample(image: &GrayImage, width: u32, height: u32, filter: ResizeFilter) -> GrayImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    image::imageops::resize(image, width, height, filter.to_filter_type())
}
