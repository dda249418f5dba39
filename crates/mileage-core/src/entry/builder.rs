//! Form input and the builders that turn it into validated entries.

use chrono::NaiveDate;
use uuid::Uuid;

use super::types::{Expense, Purpose, Trip};
use crate::error::{MileageError, Result};
use crate::receipt::ReceiptImage;

const TRIP_REQUIRED: &str = "Please enter a date and valid mileage before adding the trip.";
const EXPENSE_REQUIRED: &str =
    "Please enter a date, description, and valid amount for the expense.";

/// Raw trip form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripForm {
    pub date: String,
    pub purpose: Purpose,
    pub distance: String,
    pub start_location: String,
    pub end_location: String,
    pub notes: String,
}

impl TripForm {
    pub fn new(date: impl Into<String>, distance: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            distance: distance.into(),
            ..Self::default()
        }
    }

    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_locations(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_location = start.into();
        self.end_location = end.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Raw expense form input plus the staged receipt, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseForm {
    pub date: String,
    pub purpose: Purpose,
    pub description: String,
    pub amount: String,
    pub receipt: Option<ReceiptImage>,
}

impl ExpenseForm {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_receipt(mut self, receipt: ReceiptImage) -> Self {
        self.receipt = Some(receipt);
        self
    }
}

/// Validate a trip form and build a trip with a fresh identifier.
///
/// # Errors
///
/// Returns `MileageError::Validation` if:
/// - Date is empty or not a calendar date
/// - Distance is missing, non-numeric or not strictly positive
pub fn build_trip(form: &TripForm) -> Result<Trip> {
    let date = parse_date(&form.date, TRIP_REQUIRED)?;
    let distance = parse_positive(&form.distance, TRIP_REQUIRED)?;

    Ok(Trip {
        id: Uuid::now_v7(),
        date,
        purpose: form.purpose,
        distance,
        start_location: non_empty(&form.start_location),
        end_location: non_empty(&form.end_location),
        notes: non_empty(&form.notes),
    })
}

/// Validate an expense form and build an expense carrying the staged receipt.
///
/// # Errors
///
/// Returns `MileageError::Validation` if:
/// - Date is empty or not a calendar date
/// - Description is empty
/// - Amount is missing, non-numeric or not strictly positive
pub fn build_expense(form: &ExpenseForm) -> Result<Expense> {
    let date = parse_date(&form.date, EXPENSE_REQUIRED)?;
    let description = non_empty(&form.description)
        .ok_or_else(|| MileageError::Validation(EXPENSE_REQUIRED.to_string()))?;
    let amount = parse_positive(&form.amount, EXPENSE_REQUIRED)?;

    Ok(Expense {
        id: Uuid::now_v7(),
        date,
        purpose: form.purpose,
        description,
        amount,
        receipt: form.receipt.clone(),
    })
}

fn parse_date(value: &str, required: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MileageError::Validation(required.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        MileageError::Validation(format!(
            "Invalid date (expected YYYY-MM-DD): {}",
            trimmed
        ))
    })
}

fn parse_positive(value: &str, required: &str) -> Result<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| MileageError::Validation(required.to_string()))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(MileageError::Validation(required.to_string()));
    }
    Ok(parsed)
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
