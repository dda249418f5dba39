//! Spreadsheet export of the ledger.
//!
//! Produces a single-sheet `.xlsx` workbook in memory. Writing it to disk is
//! the caller's job.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::NaiveDate;
use log::{info, warn};
use rust_xlsxwriter::{Format, Image, Workbook, Worksheet};

use crate::entry::Entry;
use crate::error::{MileageError, Result};
use crate::receipt::ReceiptImage;

pub const SHEET_NAME: &str = "Mileage & Expenses";

pub const HEADERS: [&str; 6] = [
    "Date",
    "Type",
    "Purpose",
    "Description",
    "Amount/Mileage",
    "Receipt",
];

pub const COLUMN_WIDTHS: [f64; 6] = [12.0, 10.0, 10.0, 30.0, 15.0, 15.0];

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Height of rows carrying an embedded receipt.
pub const IMAGE_ROW_HEIGHT: f64 = 120.0;

pub const NO_DATA: &str = "No data to export.";

const RECEIPT_COLUMN: u16 = 5;

/// Contents of the Receipt column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptCell {
    No,
    SeeImage,
}

impl ReceiptCell {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "No",
            Self::SeeImage => "See image",
        }
    }
}

/// One worksheet row, before it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow<'a> {
    pub date: String,
    pub kind: &'static str,
    pub purpose: &'static str,
    pub description: String,
    pub amount: f64,
    pub receipt: ReceiptCell,
    pub image: Option<&'a ReceiptImage>,
}

/// Flatten entries into rows, in ledger order.
pub fn ledger_rows(entries: &[Entry]) -> Vec<ExportRow<'_>> {
    entries
        .iter()
        .map(|entry| match entry {
            Entry::Trip(trip) => ExportRow {
                date: trip.date.format("%Y-%m-%d").to_string(),
                kind: entry.kind().as_str(),
                purpose: trip.purpose.as_str(),
                description: trip.route(),
                amount: trip.distance,
                receipt: ReceiptCell::No,
                image: None,
            },
            Entry::Expense(expense) => ExportRow {
                date: expense.date.format("%Y-%m-%d").to_string(),
                kind: entry.kind().as_str(),
                purpose: expense.purpose.as_str(),
                description: expense.description.clone(),
                amount: expense.amount,
                receipt: if expense.receipt.is_some() {
                    ReceiptCell::SeeImage
                } else {
                    ReceiptCell::No
                },
                image: expense.receipt.as_ref(),
            },
        })
        .collect()
}

/// `mileage-expense-log-<YYYY-MM-DD>.xlsx`
pub fn file_name_for(today: NaiveDate) -> String {
    format!("mileage-expense-log-{}.xlsx", today.format("%Y-%m-%d"))
}

/// A generated workbook ready to be saved.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    pub rows: usize,
    /// Non-fatal problems, such as receipts that could not be embedded
    pub warnings: Vec<String>,
}

/// Place a receipt image in the Receipt cell of `row`, enlarging the row.
fn embed_receipt(worksheet: &mut Worksheet, row: u32, receipt: &ReceiptImage) -> Result<()> {
    let bytes = receipt.decode()?;
    let image = contained(|| Image::new_from_buffer(&bytes))??;
    worksheet.set_row_height(row, IMAGE_ROW_HEIGHT)?;
    contained(|| {
        worksheet
            .insert_image_fit_to_cell(row, RECEIPT_COLUMN, &image, true)
            .map(|_| ())
    })??;
    Ok(())
}

/// Run an image library call, turning a panic on malformed data into an error.
fn contained<T>(call: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| {
        MileageError::Export(format!("unreadable image ({})", panic_text(&*payload)))
    })
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

/// Serialize the ledger into an xlsx workbook.
///
/// # Errors
///
/// - `MileageError::Validation` with `No data to export.` if `entries` is empty
/// - `MileageError::Export` if the workbook cannot be generated
pub fn export_ledger(entries: &[Entry], today: NaiveDate) -> Result<ExportedFile> {
    if entries.is_empty() {
        return Err(MileageError::Validation(NO_DATA.to_string()));
    }

    let rows = ledger_rows(entries);
    let mut warnings = Vec::new();
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        worksheet.write_string(r, 0, &row.date)?;
        worksheet.write_string(r, 1, row.kind)?;
        worksheet.write_string(r, 2, row.purpose)?;
        worksheet.write_string(r, 3, &row.description)?;
        worksheet.write_number(r, 4, row.amount)?;
        worksheet.write_string(r, RECEIPT_COLUMN, row.receipt.as_str())?;

        if let Some(receipt) = row.image {
            if let Err(e) = embed_receipt(worksheet, r, receipt) {
                warn!("Could not embed receipt on row {}: {}", r + 1, e);
                warnings.push(format!("Error adding image to Excel: {}", e));
            }
        }
    }

    let bytes = workbook
        .save_to_buffer()
        .map_err(|e| MileageError::Export(format!("Failed to generate Excel file: {}", e)))?;

    let file_name = file_name_for(today);
    info!(
        "Exported {} entries to {} ({} bytes)",
        rows.len(),
        file_name,
        bytes.len()
    );

    Ok(ExportedFile {
        file_name,
        mime_type: XLSX_MIME,
        bytes,
        rows: rows.len(),
        warnings,
    })
}
