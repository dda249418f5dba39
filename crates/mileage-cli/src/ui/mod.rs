//! UI primitives for the Mileage CLI.
//!
//! This module provides:
//! - **Context**: Terminal detection and output mode (json, plain, pretty)
//! - **Theme**: Badge tokens and styles
//! - **Render**: Tables, headers, notices, hints
//! - **Progress**: Spinner for network calls
//! - **Format**: String utilities (truncate, amounts, ids)

mod context;
pub mod format;
pub mod progress;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use theme::Badge;

pub use render::{badge, header, hint, kv, notice, print, print_error, simple_table};

pub use progress::Spinner;
