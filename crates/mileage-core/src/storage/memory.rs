//! In-memory entry store.

use log::info;

use super::traits::EntryStore;
use crate::entry::Entry;

/// Vec-backed store kept sorted by date, newest first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for MemoryStore {
    fn append(&mut self, entry: Entry) {
        info!(
            "Appending {} entry {} dated {}",
            entry.kind().as_str(),
            entry.id(),
            entry.date()
        );
        self.entries.push(entry);
        // sort_by is stable: same-date entries keep insertion order
        self.entries.sort_by(|a, b| b.date().cmp(&a.date()));
    }

    fn clear(&mut self) {
        info!("Clearing {} entries", self.entries.len());
        self.entries.clear();
    }

    fn all(&self) -> &[Entry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{build_expense, build_trip, ExpenseForm, TripForm};

    fn trip(date: &str) -> Entry {
        build_trip(&TripForm::new(date, "1")).unwrap().into()
    }

    fn expense(date: &str) -> Entry {
        build_expense(&ExpenseForm::new(date, "Parking", "5")).unwrap().into()
    }

    #[test]
    fn test_append_orders_newest_first() {
        let mut store = MemoryStore::new();
        store.append(trip("2024-05-01"));
        store.append(trip("2024-06-15"));
        store.append(expense("2023-12-31"));

        let dates: Vec<String> = store.all().iter().map(|e| e.date().to_string()).collect();
        assert_eq!(dates, vec!["2024-06-15", "2024-05-01", "2023-12-31"]);
    }

    #[test]
    fn test_same_date_keeps_insertion_order() {
        let mut store = MemoryStore::new();
        let first = trip("2024-05-01");
        let second = expense("2024-05-01");
        let third = trip("2024-05-01");
        let ids = [first.id(), second.id(), third.id()];

        store.append(first);
        store.append(trip("2024-04-01"));
        store.append(second);
        store.append(third);

        let same_day: Vec<_> = store
            .all()
            .iter()
            .filter(|e| e.date().to_string() == "2024-05-01")
            .map(|e| e.id())
            .collect();
        assert_eq!(same_day, ids);
        assert_eq!(store.all()[3].date().to_string(), "2024-04-01");
    }

    #[test]
    fn test_clear_empties_store() {
        let mut store = MemoryStore::new();
        store.append(trip("2024-05-01"));
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(store.is_empty());
    }
}
