use std::io::Read;

use crate::config::ThumbnailConfig;
use crate::container::locate_payload;
use crate::error::ThumbnailError;
use crate::image::{decode, pack, ThumbnailResult};
use crate::stream::read_all;

/// Extract the embedded preview from an already opened container stream.
///
/// Runs read, scan, decode and pack once; the first failing stage ends the
/// call. The source is left open.
pub fn extract_thumbnail<R>(source: &mut R) -> Result<ThumbnailResult, ThumbnailError>
where
    R: Read + ?Sized,
{
    extract_thumbnail_with(source, &ThumbnailConfig::default())
}

/// Like [`extract_thumbnail`], with a caller supplied configuration. An
/// invalid configuration fails before the source is read.
pub fn extract_thumbnail_with<R>(
    source: &mut R,
    config: &ThumbnailConfig,
) -> Result<ThumbnailResult, ThumbnailError>
where
    R: Read + ?Sized,
{
    config.validate()?;

    let buffer = read_all(source, config.chunk_size)?;

    let decoded = {
        let payload = locate_payload(&buffer, config.delimiter_bytes())?;
        decode(payload.bytes())?
    };
    drop(buffer);

    pack(&decoded)
}

/// Two-step provider: the host hands over a stream once, then asks for the
/// thumbnail.
#[derive(Debug)]
pub struct ThumbnailProvider<R> {
    config: ThumbnailConfig,
    stream: Option<R>,
}

impl<R: Read> ThumbnailProvider<R> {
    pub fn new(config: ThumbnailConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Store the source stream. A provider accepts exactly one stream; later
    /// calls fail and keep the first one.
    pub fn initialize(&mut self, stream: R) -> Result<(), ThumbnailError> {
        if self.stream.is_some() {
            return Err(ThumbnailError::AlreadyInitialized);
        }
        self.stream = Some(stream);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.stream.is_some()
    }

    pub fn thumbnail(&mut self) -> Result<ThumbnailResult, ThumbnailError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or(ThumbnailError::NotInitialized)?;
        extract_thumbnail_with(stream, &self.config)
    }

    /// Hosts pass the edge length they would like; the preview is always
    /// returned at its stored size and the host scales it.
    pub fn thumbnail_sized(&mut self, requested: u32) -> Result<ThumbnailResult, ThumbnailError> {
        log::debug!("Thumbnail requested at {requested}px, returning stored size");
        self.thumbnail()
    }

    pub fn into_inner(self) -> Option<R> {
        self.stream
    }
}

impl<R: Read> Default for ThumbnailProvider<R> {
    fn default() -> Self {
        Self::new(ThumbnailConfig::default())
    }
}
