//! Stride-aligned pixel layout
//!
//! Rows are padded to a 4-byte boundary, the layout a 24bpp device
//! independent bitmap expects. Padding bytes are always zero.

use super::{DecodedImage, BYTES_PER_PIXEL};
use crate::error::ThumbnailError;

/// Display-ready thumbnail: opaque BGR rows, each `stride` bytes long
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ThumbnailResult {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    #[serde(skip)]
    pub pixels: Vec<u8>,
    pub has_alpha: bool,
}

impl ThumbnailResult {
    /// Row `y` including its padding
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let stride = self.stride as usize;
        let start = (y as usize).checked_mul(stride)?;
        self.pixels.get(start..start.checked_add(stride)?)
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }
}

/// Byte sizes of a packed thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub row_bytes: usize,
    pub stride: usize,
    pub len: usize,
}

/// Row width in bytes rounded up to the next multiple of 4
pub fn stride_for(width: u32) -> Option<usize> {
    let row_bytes = (width as usize).checked_mul(BYTES_PER_PIXEL)?;
    Some(row_bytes.checked_add(3)? & !3)
}

/// Compute the packed layout, failing closed on any overflow.
///
/// The stride must fit a `u32` and the total must stay below `isize::MAX`,
/// the largest allocation the platform can address.
pub fn layout(width: u32, height: u32) -> Result<Layout, ThumbnailError> {
    let overflow = || ThumbnailError::DimensionOverflow { width, height };

    let row_bytes = (width as usize)
        .checked_mul(BYTES_PER_PIXEL)
        .ok_or_else(overflow)?;
    let stride = stride_for(width).ok_or_else(overflow)?;
    u32::try_from(stride).map_err(|_| overflow())?;

    let len = (height as usize).checked_mul(stride).ok_or_else(overflow)?;
    if len > isize::MAX as usize {
        return Err(overflow());
    }

    Ok(Layout {
        row_bytes,
        stride,
        len,
    })
}

/// Copy decoded rows into a zero-filled, stride-padded buffer
pub fn pack(decoded: &DecodedImage) -> Result<ThumbnailResult, ThumbnailError> {
    let (width, height) = decoded.dimensions();
    let Layout {
        row_bytes,
        stride,
        len,
    } = layout(width, height)?;

    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|_| ThumbnailError::Allocation { bytes: len })?;
    pixels.resize(len, 0);

    for (src, dst) in decoded
        .samples()
        .chunks_exact(row_bytes)
        .zip(pixels.chunks_exact_mut(stride))
    {
        dst[..row_bytes].copy_from_slice(src);
    }

    log::debug!("Packed {width}x{height} thumbnail, stride {stride}, {len} bytes");

    Ok(ThumbnailResult {
        width,
        height,
        // checked by `layout`
        stride: stride as u32,
        pixels,
        has_alpha: false,
    })
}
