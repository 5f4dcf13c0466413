use std::fs;
use std::path::{Path, PathBuf};

use crate::container::DELIMITER;
use crate::error::ConfigError;
use crate::stream::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Closing tag that ends the container header
    pub delimiter: String,
    /// Bytes requested from the source per read
    pub chunk_size: usize,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            delimiter: String::from_utf8_lossy(DELIMITER).into_owned(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ThumbnailConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }

    pub fn delimiter_bytes(&self) -> &[u8] {
        self.delimiter.as_bytes()
    }

    pub fn load() -> Option<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Option<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
    }

    pub fn save_to(&self, path: &Path) -> Option<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }

        serde_json::to_string_pretty(self)
            .ok()
            .and_then(|json| fs::write(path, json).ok())
    }

    fn config_path() -> Option<PathBuf> {
        let home = std::env::home_dir()?;
        Some(home.join(".config").join("kiseki-thumb").join("config.json"))
    }
}
