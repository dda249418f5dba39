//! Output formatting for the ledger log.

use serde_json::{json, Value};

use mileage_core::Entry;

use crate::ui::format::{
    entry_description, entry_value, format_amount, format_miles, short_id, truncate,
};
use crate::ui::{header, kv, simple_table, UiContext};

const DESCRIPTION_WIDTH: usize = 40;

const COLUMNS: [&str; 7] = [
    "ID",
    "Date",
    "Type",
    "Purpose",
    "Description",
    "Amount/Mileage",
    "Receipt",
];

/// JSON view of one entry. Receipt payloads are summarized, not inlined.
pub fn entry_json(entry: &Entry) -> Value {
    match entry {
        Entry::Trip(trip) => json!({
            "id": trip.id,
            "type": "trip",
            "date": trip.date,
            "purpose": trip.purpose,
            "distance": trip.distance,
            "start_location": trip.start_location,
            "end_location": trip.end_location,
            "notes": trip.notes,
        }),
        Entry::Expense(expense) => json!({
            "id": expense.id,
            "type": "expense",
            "date": expense.date,
            "purpose": expense.purpose,
            "description": expense.description,
            "amount": expense.amount,
            "receipt": expense.receipt.as_ref().map(|r| json!({
                "format": r.format(),
                "bytes": r.size_hint(),
            })),
        }),
    }
}

pub fn entries_json(entries: &[Entry]) -> anyhow::Result<String> {
    let values: Vec<Value> = entries.iter().map(entry_json).collect();
    Ok(serde_json::to_string_pretty(&values)?)
}

/// Sum of trip miles and expense amounts.
pub fn totals(entries: &[Entry]) -> (f64, f64) {
    entries.iter().fold((0.0, 0.0), |(miles, amount), entry| match entry {
        Entry::Trip(trip) => (miles + trip.distance, amount),
        Entry::Expense(expense) => (miles, amount + expense.amount),
    })
}

/// Render the log view.
pub fn render_log(ctx: &UiContext, entries: &[Entry]) -> String {
    let count = format!(
        "{} {}",
        entries.len(),
        if entries.len() == 1 { "entry" } else { "entries" }
    );
    let mut lines = vec![header(ctx, "log", Some(&count))];

    if entries.is_empty() {
        lines.push("No entries yet.".to_string());
        return lines.join("\n");
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                short_id(&entry.id()),
                entry.date().format("%Y-%m-%d").to_string(),
                entry.kind().as_str().to_string(),
                entry.purpose().as_str().to_string(),
                truncate(&entry_description(entry), DESCRIPTION_WIDTH),
                entry_value(entry),
                if entry.has_receipt() { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    lines.push(simple_table(ctx, &COLUMNS, &rows));

    let (miles, amount) = totals(entries);
    lines.push(kv(ctx, "Total miles", &format_miles(miles)));
    lines.push(kv(ctx, "Total expenses", &format_amount(amount)));
    lines.join("\n")
}
