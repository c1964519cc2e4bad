use thiserror::Error;

/// Main error type for streamtail
#[derive(Debug, Error)]
pub enum TailError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    // Log group queries
    #[error("Stream discovery failed: {0}")]
    DiscoveryError(String),

    #[error("Failed to fetch log events: {0}")]
    FetchError(String),

    // IO errors (automatically converted from std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TailError {
    /// Process exit code for this error.
    ///
    /// Configuration and discovery failures get codes distinct from the
    /// "no matching stream" exit code 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            TailError::ConfigError(_) | TailError::InvalidConfig(_) => 2,
            TailError::DiscoveryError(_) => 3,
            _ => 1,
        }
    }
}

/// Result type alias for streamtail operations
pub type Result<T> = std::result::Result<T, TailError>;
