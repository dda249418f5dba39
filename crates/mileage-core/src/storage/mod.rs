//! Entry storage.
//!
//! The ledger lives only in process memory; the trait keeps the session
//! independent of the concrete collection.

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::EntryStore;
