//! Error types for the tollgate packet filter.

use std::io;

use thiserror::Error;

/// Main error type for tollgate operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("blacklist error: {0}")]
    Blacklist(#[from] crate::blacklist::loader::LoadError),

    #[error("interception error: {0}")]
    Intercept(#[from] InterceptError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("metrics error: {0}")]
    Metrics(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Network-related errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no suitable network interface found")]
    NoInterface,

    #[error("failed to open datalink channel: {0}")]
    ChannelOpen(String),

    #[error("unsupported channel type")]
    UnsupportedChannel,

    #[error("failed to send packet: {0}")]
    SendFailed(String),
}

/// Errors from the interception point lifecycle.
///
/// Only registration and deregistration can fail. The per-packet path never
/// surfaces errors; anything the hook cannot make sense of resolves to an
/// Accept verdict instead.
#[derive(Debug, Error)]
pub enum InterceptError {
    #[error("a hook is already registered")]
    AlreadyRegistered,

    #[error("no hook is registered")]
    NotRegistered,
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
