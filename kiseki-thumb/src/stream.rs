//! Draining a byte source into memory

use std::io::Read;

use crate::error::{ConfigError, ThumbnailError};

pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Read `source` to its end in `chunk_size` pieces.
///
/// A read returning zero bytes ends the stream. Any read error aborts the
/// whole operation, including `Interrupted`, and the bytes gathered so far are
/// dropped. The source is only borrowed; closing it is up to the caller.
pub fn read_all<R>(source: &mut R, chunk_size: usize) -> Result<Vec<u8>, ThumbnailError>
where
    R: Read + ?Sized,
{
    if chunk_size == 0 {
        return Err(ConfigError::ZeroChunkSize.into());
    }

    let mut buffer = Vec::new();
    let mut chunk = vec![0u8; chunk_size];

    loop {
        let n = source.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    log::debug!("Read {} bytes from container stream", buffer.len());
    Ok(buffer)
}
