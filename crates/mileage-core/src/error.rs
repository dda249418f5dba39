//! Error types for Mileage core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these to
//! notices, exit codes and hints.

use thiserror::Error;

/// Result type alias for Mileage operations.
pub type Result<T> = std::result::Result<T, MileageError>;

/// Core error type for Mileage operations.
#[derive(Debug, Error)]
pub enum MileageError {
    /// Missing or invalid form input
    #[error("{0}")]
    Validation(String),

    /// Required configuration (API key, client credentials) is absent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The external service could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The directions provider found no route between the locations
    #[error("No route found: {0}")]
    NoRoute(String),

    /// The external service answered with an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// A platform capability (camera, photo library) is absent
    #[error("{0}")]
    CapabilityUnavailable(String),

    /// Image acquisition failed
    #[error("Failed to capture photo: {0}")]
    Capture(String),

    /// Spreadsheet generation failed
    #[error("Export error: {0}")]
    Export(String),

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}

impl MileageError {
    /// Whether the error came from an external service rather than local input.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            MileageError::Network(_) | MileageError::NoRoute(_) | MileageError::Provider(_)
        )
    }
}

impl From<std::io::Error> for MileageError {
    fn from(err: std::io::Error) -> Self {
        MileageError::Other(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for MileageError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        MileageError::Export(err.to_string())
    }
}
