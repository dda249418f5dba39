//! String formatting utilities for UI rendering.

use mileage_core::Entry;
use uuid::Uuid;

/// Truncate a string to max length, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s.chars().take(max_len).collect();
    }
    let truncated: String = s.chars().take(max_len - 3).collect();
    format!("{}...", truncated)
}

/// Format a short ID from a UUID (last 8 hex characters).
///
/// v7 ids share their leading timestamp bits, so the tail is the
/// distinguishing part.
pub fn short_id(id: &Uuid) -> String {
    let simple = id.simple().to_string();
    simple[simple.len() - 8..].to_string()
}

/// Format a currency amount with two decimals.
pub fn format_amount(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format a distance in miles with one decimal.
pub fn format_miles(miles: f64) -> String {
    format!("{:.1} mi", miles)
}

/// Amount/mileage column text for an entry.
pub fn entry_value(entry: &Entry) -> String {
    match entry {
        Entry::Trip(trip) => format_miles(trip.distance),
        Entry::Expense(expense) => format_amount(expense.amount),
    }
}

/// Description column text for an entry.
pub fn entry_description(entry: &Entry) -> String {
    match entry {
        Entry::Trip(trip) => {
            let route = trip.route();
            match (&trip.notes, route.is_empty()) {
                (Some(notes), true) => notes.clone(),
                (Some(notes), false) => format!("{} ({})", route, notes),
                (None, _) => route,
            }
        }
        Entry::Expense(expense) => expense.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long description", 10), "a long ...");
    }

    #[test]
    fn test_short_id_length() {
        assert_eq!(short_id(&Uuid::now_v7()).len(), 8);
    }

    #[test]
    fn test_amount_and_miles() {
        assert_eq!(format_amount(8.5), "$8.50");
        assert_eq!(format_miles(12.44), "12.4 mi");
    }
}
