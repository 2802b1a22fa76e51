//! Thread-safe ledger entry storage for async batch processing
//!
//! This module provides the `AsyncEntryStore` struct, which stores ledger
//! entries using concurrent data structures to enable safe multi-threaded
//! access.
//!
//! # Design
//!
//! The `AsyncEntryStore` uses `DashMap` (a concurrent HashMap) for
//! thread-safe entry storage with fine-grained locking. Settlement state
//! transitions go through `set_settled`, which flips the flag and the
//! transaction link together while holding the entry's lock, so a settled
//! entry always carries its link.
//!
//! # Thread Safety
//!
//! All operations are thread-safe and prevent data races through DashMap's
//! internal synchronization. Operations on different entries proceed in
//! parallel; operations on the same entry are serialized.

use crate::types::{EntryId, LedgerEntry, LedgerError, TxId};
use dashmap::DashMap;

/// Thread-safe ledger entry store
///
/// Provides concurrent access to ledger entries using `DashMap` for
/// fine-grained locking. Multiple threads can safely touch different
/// entries simultaneously.
#[derive(Debug)]
pub struct AsyncEntryStore {
    /// Concurrent map of entry ID to stored entry
    entries: DashMap<EntryId, LedgerEntry>,
}

impl AsyncEntryStore {
    /// Create a new empty AsyncEntryStore
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert a ledger entry under a unique ID
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntry` if an entry with this ID already exists.
    /// The existing entry is kept.
    pub fn insert(&self, entry: EntryId, ledger_entry: LedgerEntry) -> Result<(), LedgerError> {
        match self.entries.entry(entry) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(LedgerError::duplicate_entry(entry, ledger_entry.member))
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(ledger_entry);
                Ok(())
            }
        }
    }

    /// Get a ledger entry by ID
    ///
    /// Returns a clone: a snapshot at the time of the call.
    pub fn get(&self, entry: EntryId) -> Option<LedgerEntry> {
        self.entries.get(&entry).map(|e| e.clone())
    }

    /// Update an entry's settlement state and transaction link together
    ///
    /// The flag and the link change atomically under the entry's lock.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no entry with this ID exists.
    pub fn set_settled(
        &self,
        entry: EntryId,
        settled: bool,
        linked_tx: Option<TxId>,
    ) -> Result<(), LedgerError> {
        match self.entries.get_mut(&entry) {
            Some(mut stored) => {
                let e = stored.value_mut();
                e.settled = settled;
                e.linked_tx = linked_tx;
                Ok(())
            }
            None => Err(LedgerError::entry_not_found(entry, "set_settled")),
        }
    }
}

impl Default for AsyncEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryKind;
    use rust_decimal::Decimal;

    #[test]
    fn test_insert_and_get_entry() {
        let store = AsyncEntryStore::new();

        store
            .insert(1, LedgerEntry::new(1, EntryKind::Debt, Decimal::new(50000, 2)))
            .unwrap();

        let entry = store.get(1).unwrap();
        assert_eq!(entry.member, 1);
        assert_eq!(entry.kind, EntryKind::Debt);
        assert_eq!(entry.amount, Decimal::new(50000, 2));
        assert!(!entry.settled);
        assert_eq!(entry.linked_tx, None);
    }

    #[test]
    fn test_get_nonexistent_entry() {
        let store = AsyncEntryStore::new();
        assert!(store.get(999).is_none());
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let store = AsyncEntryStore::new();

        store
            .insert(1, LedgerEntry::new(1, EntryKind::Credit, Decimal::new(10000, 2)))
            .unwrap();

        let result = store.insert(
            1,
            LedgerEntry::new(2, EntryKind::Debt, Decimal::new(5000, 2)),
        );

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::DuplicateEntry { .. }
        ));

        // Original entry kept
        let entry = store.get(1).unwrap();
        assert_eq!(entry.member, 1);
        assert_eq!(entry.kind, EntryKind::Credit);
    }

    #[test]
    fn test_set_settled_links_transaction() {
        let store = AsyncEntryStore::new();

        store
            .insert(1, LedgerEntry::new(1, EntryKind::Credit, Decimal::new(20000, 2)))
            .unwrap();

        store.set_settled(1, true, Some(7)).unwrap();
        let settled = store.get(1).unwrap();
        assert!(settled.settled);
        assert_eq!(settled.linked_tx, Some(7));

        store.set_settled(1, false, None).unwrap();
        let unsettled = store.get(1).unwrap();
        assert!(!unsettled.settled);
        assert_eq!(unsettled.linked_tx, None);
    }

    #[test]
    fn test_set_settled_nonexistent_entry() {
        let store = AsyncEntryStore::new();

        let result = store.set_settled(999, true, Some(1));
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::EntryNotFound { .. }
        ));
    }

    #[test]
    fn test_concurrent_inserts_to_different_entries() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(AsyncEntryStore::new());
        let mut handles = vec![];

        for i in 0u32..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                store_clone
                    .insert(
                        i,
                        LedgerEntry::new(
                            (i % 3) as u16,
                            EntryKind::Debt,
                            Decimal::new((i as i64 + 1) * 100, 2),
                        ),
                    )
                    .unwrap();
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0u32..10 {
            assert!(store.get(i).is_some());
        }
    }

    #[test]
    fn test_concurrent_inserts_same_id_exactly_one_wins() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{Arc, Barrier};
        use std::thread;

        let store = Arc::new(AsyncEntryStore::new());
        let barrier = Arc::new(Barrier::new(10));
        let wins = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for i in 0u16..10 {
            let store_clone = Arc::clone(&store);
            let barrier_clone = Arc::clone(&barrier);
            let wins_clone = Arc::clone(&wins);
            let handle = thread::spawn(move || {
                barrier_clone.wait();
                if store_clone
                    .insert(1, LedgerEntry::new(i, EntryKind::Debt, Decimal::new(100, 2)))
                    .is_ok()
                {
                    wins_clone.fetch_add(1, Ordering::SeqCst);
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert!(store.get(1).is_some());
    }

    #[test]
    fn test_concurrent_settlement_toggles_different_entries() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(AsyncEntryStore::new());
        for i in 0u32..10 {
            store
                .insert(
                    i,
                    LedgerEntry::new(i as u16, EntryKind::Credit, Decimal::new(10000, 2)),
                )
                .unwrap();
        }

        let mut handles = vec![];
        for i in 0u32..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                store_clone.set_settled(i, true, Some(i + 100)).unwrap();
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0u32..10 {
            let entry = store.get(i).unwrap();
            assert!(entry.settled);
            assert_eq!(entry.linked_tx, Some(i + 100));
        }
    }
}
