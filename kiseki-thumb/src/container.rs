//! Locating the embedded image inside a container buffer
//!
//! Containers are a text header, the closing tag, one terminator byte, then
//! the compressed image up to end of file. There is no length prefix.

use memchr::memmem;

use crate::error::{ConfigError, ThumbnailError};

/// Closing tag of the container header
pub const DELIMITER: &[u8] = b"</roblox>";
// Bytes between the delimiter and the image, always skipped
const TERMINATOR_LEN: usize = 1;

/// Image bytes trailing the container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerPayload<'a> {
    offset: usize,
    bytes: &'a [u8],
}

impl<'a> ContainerPayload<'a> {
    /// Position of the first payload byte in the scanned buffer
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Find the first `delimiter` in `buffer` and return everything after it and
/// its terminator byte.
///
/// The terminator's value is never inspected.
pub fn locate_payload<'a>(
    buffer: &'a [u8],
    delimiter: &[u8],
) -> Result<ContainerPayload<'a>, ThumbnailError> {
    if delimiter.is_empty() {
        return Err(ConfigError::EmptyDelimiter.into());
    }

    let found = memmem::find(buffer, delimiter).ok_or(ThumbnailError::DelimiterNotFound)?;

    let start = found + delimiter.len() + TERMINATOR_LEN;
    if start >= buffer.len() {
        return Err(ThumbnailError::NoPayload);
    }

    log::debug!(
        "Delimiter at offset {found}, payload is {} bytes",
        buffer.len() - start
    );

    Ok(ContainerPayload {
        offset: start,
        bytes: &buffer[start..],
    })
}
