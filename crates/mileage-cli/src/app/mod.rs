//! Application-level utilities for the Mileage CLI.
//!
//! This module provides:
//! - Path resolution for the config file
//! - Lazily loaded configuration and async runtime
//! - Construction of the ledger session from configuration

mod context;
mod resolver;

pub use context::AppContext;
pub use resolver::resolve_config_path;
