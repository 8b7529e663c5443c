//! Error types for twitch-bot-config.

/// Result type alias for twitch-bot-config operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while synchronizing configuration into the store.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Failed to locate or read the configuration file.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// The configuration file exists but could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// File watching failed to initialize or register the config file.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// The `log.level` value is not a recognized level string.
    #[error("Invalid log level: {raw:?}")]
    InvalidLogLevel {
        /// The raw value read from the configuration file.
        raw: String,
    },

    /// A key-value store operation failed.
    #[error("Store error: {0}")]
    StoreError(#[from] redis::RedisError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
