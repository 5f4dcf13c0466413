//! Image encoding: turning thumbnails back into files

use std::path::Path;

use image::{DynamicImage, ImageResult, RgbImage};

use super::{ThumbnailResult, BYTES_PER_PIXEL};

/// Compress an image to JPEG format with the specified quality.
///
/// Alpha is dropped, JPEG has no channel for it.
pub fn compress_to_jpeg<W>(img: &DynamicImage, writer: &mut W, quality: u8) -> ImageResult<()>
where
    W: std::io::Write,
{
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
}

/// Strip row padding and restore RGB channel order
pub fn to_rgb_image(thumb: &ThumbnailResult) -> Option<RgbImage> {
    let row_bytes = thumb.row_bytes();
    let mut raw = Vec::with_capacity(row_bytes * thumb.height as usize);

    for y in 0..thumb.height {
        let row = thumb.row(y)?;
        for px in row.get(..row_bytes)?.chunks_exact(BYTES_PER_PIXEL) {
            raw.extend_from_slice(&[px[2], px[1], px[0]]);
        }
    }

    RgbImage::from_raw(thumb.width, thumb.height, raw)
}

/// Write a thumbnail to `path`, format chosen from the extension
pub fn save(thumb: &ThumbnailResult, path: &Path) -> ImageResult<()> {
    let img = to_rgb_image(thumb).ok_or_else(|| {
        image::ImageError::Parameter(image::error::ParameterError::from_kind(
            image::error::ParameterErrorKind::DimensionMismatch,
        ))
    })?;

    log::debug!("Writing {}x{} thumbnail to {}", thumb.width, thumb.height, path.display());
    img.save(path)
}
