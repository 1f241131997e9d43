//! Error types for the pitch kinematics library.

use thiserror::Error;

/// Main error type for the library
///
/// Missing events and thin data are not errors here. Those surface as `None`
/// fields and log warnings; only structural problems reach this enum.
#[derive(Error, Debug)]
pub enum Error {
    /// Input violates the frame/keypoint shape contract
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ball quality classifier could not produce a probability
    #[error("Classifier error: {0}")]
    ClassifierError(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding or encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding or encoding failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
