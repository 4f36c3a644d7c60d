use crate::error::ConfigError;

/// Read size used by the reference request pipeline.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Settings for the buffering [`Multipart`](crate::Multipart) drivers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of bytes read from the source per parser write.
    pub chunk_size: usize,
}

impl Config {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of bytes read from the source per parser write.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Validates configured values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue { name: "chunk_size" });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
