//! # Mileage Core
//!
//! Core library for Mileage - a trip and expense log for sports officials.
//!
//! This crate provides the domain model, validation, the in-memory ledger and
//! the integrations (directions lookup, spreadsheet export, OAuth token
//! exchange) independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **entry**: Trip/expense records and the form builders that validate them
//! - **storage**: Entry store trait and the in-memory implementation
//! - **session**: Forms, active view, notices and the two-step clear
//! - **distance**: Directions API lookup for trip mileage
//! - **receipt**: Receipt image capture capability
//! - **export**: Spreadsheet (xlsx) export
//! - **oauth**: Authorization-code token exchange

pub mod distance;
pub mod entry;
pub mod error;
pub mod export;
pub mod notice;
pub mod oauth;
pub mod receipt;
pub mod session;
pub mod storage;

pub use entry::{Entry, EntryKind, Expense, ExpenseForm, Purpose, Trip, TripForm};
pub use error::{MileageError, Result};
pub use export::{export_ledger, ExportedFile};
pub use notice::{Clock, Notice, NoticeKind, SystemClock};
pub use receipt::{CaptureSource, ImageFormat, ImageSource, ReceiptCapture, ReceiptImage};
pub use session::{ClearOutcome, LedgerSession, View};
pub use storage::{EntryStore, MemoryStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
