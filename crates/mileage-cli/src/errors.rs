//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use mileage_core::MileageError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, receipt file)
    NotFound { message: String, hint: String },

    /// Invalid user input
    InvalidInput(String),

    /// Missing or invalid configuration
    Configuration {
        message: String,
        hint: Option<String>,
    },

    /// Directions or token service failure
    ExternalService(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::Configuration { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) | CliError::ExternalService(message) => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Create a Configuration error with message and hint.
    pub fn configuration_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::Configuration {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Prefix the message with a script line number, keeping the exit code.
    pub fn at_line(self, line: usize) -> Self {
        let prefix = |message: String| format!("Line {}: {}", line, message);
        match self {
            CliError::NotFound { message, hint } => CliError::NotFound {
                message: prefix(message),
                hint,
            },
            CliError::InvalidInput(message) => CliError::InvalidInput(prefix(message)),
            CliError::Configuration { message, hint } => CliError::Configuration {
                message: prefix(message),
                hint,
            },
            CliError::ExternalService(message) => CliError::ExternalService(prefix(message)),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::Configuration { .. } => exit_codes::CONFIGURATION,
            CliError::ExternalService(_) => exit_codes::EXTERNAL_SERVICE,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

impl From<MileageError> for CliError {
    fn from(err: MileageError) -> Self {
        match err {
            MileageError::Validation(message) => CliError::InvalidInput(message),
            MileageError::Configuration(message) => CliError::Configuration {
                message,
                hint: None,
            },
            MileageError::CapabilityUnavailable(message) => CliError::Configuration {
                message,
                hint: None,
            },
            err if err.is_external() => CliError::ExternalService(err.to_string()),
            other => CliError::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::exit_codes;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::not_found("missing", "hint").exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            CliError::invalid_input("bad").exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            CliError::configuration_with_hint("no key", "set it").exit_code(),
            exit_codes::CONFIGURATION
        );
    }

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let err: CliError = MileageError::NoRoute("ZERO_RESULTS".into()).into();
        assert_eq!(err.exit_code(), exit_codes::EXTERNAL_SERVICE);

        let err: CliError = MileageError::Validation("bad".into()).into();
        assert_eq!(err.exit_code(), exit_codes::INVALID_INPUT);
    }

    #[test]
    fn test_at_line_keeps_exit_code() {
        let err = CliError::ExternalService("ZERO_RESULTS".into()).at_line(3);
        assert_eq!(err.to_string(), "Line 3: ZERO_RESULTS");
        assert_eq!(err.exit_code(), exit_codes::EXTERNAL_SERVICE);
    }

    #[test]
    fn test_display_includes_hint() {
        let err = CliError::configuration_with_hint("No API key", "Set GOOGLE_MAPS_API_KEY");
        assert_eq!(err.to_string(), "No API key\nSet GOOGLE_MAPS_API_KEY");
    }
}
