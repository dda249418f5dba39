//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config file, receipt image).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Required configuration or credentials missing.
    pub const CONFIGURATION: i32 = 5;

    /// Directions or token service failed.
    pub const EXTERNAL_SERVICE: i32 = 6;
}

/// Route served by `mileage serve`.
pub const EXCHANGE_TOKEN_PATH: &str = "/api/google/exchange-token";
