//! Core data types for ledger entries.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MileageError;
use crate::receipt::ReceiptImage;

/// Why a trip was driven or an expense incurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    #[default]
    Business,
    Personal,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Personal => "personal",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = MileageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(Self::Business),
            "personal" => Ok(Self::Personal),
            other => Err(MileageError::Validation(format!(
                "Unknown purpose \"{}\" (use business or personal)",
                other
            ))),
        }
    }
}

/// A mileage trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub date: NaiveDate,
    pub purpose: Purpose,

    /// Distance in miles
    pub distance: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Trip {
    /// "A to B" route summary, empty when neither location is known.
    pub fn route(&self) -> String {
        if self.start_location.is_none() && self.end_location.is_none() {
            return String::new();
        }
        format!(
            "{} to {}",
            self.start_location.as_deref().unwrap_or(""),
            self.end_location.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// An out-of-pocket expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub purpose: Purpose,
    pub description: String,

    /// Amount in currency units
    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptImage>,
}

/// Discriminant of an [`Entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Trip,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trip => "trip",
            Self::Expense => "expense",
        }
    }
}

/// A single ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    Trip(Trip),
    Expense(Expense),
}

impl Entry {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Trip(trip) => trip.id,
            Self::Expense(expense) => expense.id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Trip(trip) => trip.date,
            Self::Expense(expense) => expense.date,
        }
    }

    pub fn purpose(&self) -> Purpose {
        match self {
            Self::Trip(trip) => trip.purpose,
            Self::Expense(expense) => expense.purpose,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Trip(_) => EntryKind::Trip,
            Self::Expense(_) => EntryKind::Expense,
        }
    }

    pub fn has_receipt(&self) -> bool {
        matches!(self, Self::Expense(Expense { receipt: Some(_), .. }))
    }
}

impl From<Trip> for Entry {
    fn from(trip: Trip) -> Self {
        Self::Trip(trip)
    }
}

impl From<Expense> for Entry {
    fn from(expense: Expense) -> Self {
        Self::Expense(expense)
    }
}
