use std::io;

/// Pipeline stage a [`ThumbnailError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Read,
    Scan,
    Decode,
    Pack,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Setup => "setup",
            Stage::Read => "read",
            Stage::Scan => "scan",
            Stage::Decode => "decode",
            Stage::Pack => "pack",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("failed to read container stream: {0}")]
    Io(#[from] io::Error),

    #[error("container delimiter not found")]
    DelimiterNotFound,

    #[error("no image data follows the container delimiter")]
    NoPayload,

    #[error("embedded image could not be decoded: {0}")]
    Decode(String),

    #[error("thumbnail dimensions {width}x{height} overflow the addressable size")]
    DimensionOverflow { width: u32, height: u32 },

    #[error("failed to allocate {bytes} bytes for thumbnail pixels")]
    Allocation { bytes: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("provider is already initialized with a stream")]
    AlreadyInitialized,

    #[error("provider has no stream; call initialize first")]
    NotInitialized,
}

impl ThumbnailError {
    pub fn stage(&self) -> Stage {
        match self {
            ThumbnailError::Io(_) => Stage::Read,
            ThumbnailError::DelimiterNotFound | ThumbnailError::NoPayload => Stage::Scan,
            ThumbnailError::Decode(_) => Stage::Decode,
            ThumbnailError::DimensionOverflow { .. } | ThumbnailError::Allocation { .. } => {
                Stage::Pack
            }
            ThumbnailError::Config(_)
            | ThumbnailError::AlreadyInitialized
            | ThumbnailError::NotInitialized => Stage::Setup,
        }
    }
}

impl From<image::ImageError> for ThumbnailError {
    fn from(err: image::ImageError) -> Self {
        ThumbnailError::Decode(err.to_string())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("delimiter must not be empty")]
    EmptyDelimiter,

    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to write registry value under {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("failed to delete registry key {key}: {reason}")]
    Delete { key: String, reason: String },
}
