//! Entry store trait definition.

use crate::entry::Entry;

/// Ordered collection of ledger entries.
///
/// All implementations must ensure:
/// - `all()` is ordered by date, newest first
/// - Entries with the same date keep their insertion order
/// - Entries are never modified in place; the only removal is `clear()`
pub trait EntryStore {
    /// Insert an entry and restore the date ordering.
    fn append(&mut self, entry: Entry);

    /// Remove every entry.
    fn clear(&mut self);

    /// Current entries, newest date first.
    fn all(&self) -> &[Entry];

    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.all().is_empty()
    }
}
