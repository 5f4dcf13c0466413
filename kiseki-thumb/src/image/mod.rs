//! Decoding the embedded preview and laying it out for display

pub mod decode;
pub mod encode;
pub mod pack;

pub use decode::decode;
pub use encode::{compress_to_jpeg, save, to_rgb_image};
pub use pack::{layout, pack, stride_for, Layout, ThumbnailResult};

use crate::error::ThumbnailError;

/// Bytes per decoded pixel (B, G, R)
pub const BYTES_PER_PIXEL: usize = 3;

/// First frame of the embedded image as tightly packed BGR rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl DecodedImage {
    /// Wrap row-major BGR samples, checking they cover exactly `width x height`.
    pub fn from_bgr(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, ThumbnailError> {
        if width == 0 || height == 0 {
            return Err(ThumbnailError::Decode(format!(
                "image has empty dimensions {width}x{height}"
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(ThumbnailError::DimensionOverflow { width, height })?;
        if samples.len() != expected {
            return Err(ThumbnailError::Decode(format!(
                "expected {expected} sample bytes for {width}x{height}, got {}",
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }
}
