pub mod config;
pub mod container;
pub mod error;
pub mod image;
pub mod provider;
pub mod registry;
pub mod stream;

// Re-export commonly used types
pub use config::ThumbnailConfig;
pub use container::{locate_payload, ContainerPayload, DELIMITER};
pub use error::{ConfigError, RegistryError, Stage, ThumbnailError};
pub use crate::image::{DecodedImage, ThumbnailResult};
pub use provider::{extract_thumbnail, extract_thumbnail_with, ThumbnailProvider};
pub use registry::HandlerRegistration;
