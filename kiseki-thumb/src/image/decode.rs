//! Image decoding
//!
//! Only JPEG payloads are accepted. The codec is owned by `decode` and
//! dropped on every return path.

use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, ImageDecoder, ImageFormat};
use memchr::memmem;

use super::DecodedImage;
use crate::error::ThumbnailError;

/// Decode the first frame of a JPEG payload into BGR samples
pub fn decode(payload: &[u8]) -> Result<DecodedImage, ThumbnailError> {
    let format = image::guess_format(payload)?;
    if format != ImageFormat::Jpeg {
        return Err(ThumbnailError::Decode(format!(
            "expected a JPEG payload, found {format:?}"
        )));
    }

    // The codec pads missing scan data instead of failing, so a complete
    // frame is required up front
    let frame = &payload[..frame_end(payload)?];

    // Header only; pixels are decoded below
    let decoder = JpegDecoder::new(Cursor::new(frame))?;
    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(ThumbnailError::Decode(format!(
            "image has empty dimensions {width}x{height}"
        )));
    }
    log::debug!("Decoding {width}x{height} JPEG ({:?})", decoder.color_type());

    let mut samples = DynamicImage::from_decoder(decoder)?.into_rgb8().into_raw();
    rgb_to_bgr(&mut samples);

    DecodedImage::from_bgr(width, height, samples)
}

const SOS: u8 = 0xDA;
const EOI: [u8; 2] = [0xFF, 0xD9];

fn truncated(what: &str) -> ThumbnailError {
    ThumbnailError::Decode(format!("truncated JPEG stream: {what}"))
}

/// Length of the first JPEG image in `data`, up to and including its EOI.
///
/// Header segments are skipped by their length fields. Inside entropy-coded
/// data a literal 0xFF is always followed by 0x00 or a restart marker, so the
/// first `FF D9` after the first scan header ends the image.
fn frame_end(data: &[u8]) -> Result<usize, ThumbnailError> {
    let mut pos = 2;

    loop {
        if pos >= data.len() {
            return Err(truncated("no scan data"));
        }
        if data[pos] != 0xFF {
            return Err(ThumbnailError::Decode(format!(
                "expected a marker at offset {pos}, found {:#04x}",
                data[pos]
            )));
        }

        let marker = match data.get(pos + 1) {
            Some(&m) => m,
            None => return Err(truncated("marker cut off")),
        };

        match marker {
            // fill byte
            0xFF => pos += 1,
            // standalone markers carry no length
            0x01 | 0xD0..=0xD7 => pos += 2,
            0xD9 => return Err(truncated("image ends before any scan")),
            _ => {
                let len = match data.get(pos + 2..pos + 4) {
                    Some(bytes) => u16::from_be_bytes([bytes[0], bytes[1]]) as usize,
                    None => return Err(truncated("segment length cut off")),
                };
                if len < 2 {
                    return Err(ThumbnailError::Decode(format!(
                        "invalid segment length {len} at offset {pos}"
                    )));
                }
                pos += 2 + len;

                if marker == SOS {
                    let scan = data.get(pos..).ok_or_else(|| truncated("scan header cut off"))?;
                    return memmem::find(scan, &EOI)
                        .map(|end| pos + end + EOI.len())
                        .ok_or_else(|| truncated("missing end-of-image marker"));
                }
            }
        }
    }
}

fn rgb_to_bgr(samples: &mut [u8]) {
    for px in samples.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}
