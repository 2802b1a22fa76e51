//! Ledger entry storage
//!
//! This module provides the entry store that maintains all ledger entries
//! (debts and credits) and their settlement state. The store enables settle
//! and unsettle operations by allowing lookup of entries by their entry ID
//! and recording which transaction carried each settlement.
//!
//! # Duplicate Handling
//!
//! Entry IDs must be unique. Declaring an entry under an ID that is already
//! taken is rejected and the original entry is kept.

use crate::core::traits::EntryStore;
use crate::types::{EntryId, LedgerEntry, LedgerError, TxId};
use std::collections::HashMap;

/// Entry store for settlement state
///
/// Maintains a HashMap of entry ID to ledger entry. Supports inserting
/// entries, retrieving them, and updating their settled flag and
/// transaction link.
pub struct InMemoryEntryStore {
    /// Map of entry ID to ledger entry
    entries: HashMap<EntryId, LedgerEntry>,
}

impl InMemoryEntryStore {
    /// Create a new empty entry store
    pub fn new() -> Self {
        InMemoryEntryStore {
            entries: HashMap::new(),
        }
    }
}

impl EntryStore for InMemoryEntryStore {
    /// Store an entry under a unique ID
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntry` if an entry with this ID already exists.
    /// The existing entry is kept.
    fn insert(&mut self, entry: EntryId, ledger_entry: LedgerEntry) -> Result<(), LedgerError> {
        if self.entries.contains_key(&entry) {
            return Err(LedgerError::duplicate_entry(entry, ledger_entry.member));
        }

        self.entries.insert(entry, ledger_entry);
        Ok(())
    }

    /// Get an entry by ID
    fn get(&self, entry: EntryId) -> Option<LedgerEntry> {
        self.entries.get(&entry).cloned()
    }

    /// Update an entry's settled flag and transaction link
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry ID is not found.
    fn set_settled(
        &mut self,
        entry: EntryId,
        settled: bool,
        linked_tx: Option<TxId>,
    ) -> Result<(), LedgerError> {
        let ledger_entry = self
            .entries
            .get_mut(&entry)
            .ok_or_else(|| LedgerError::entry_not_found(entry, "set_settled"))?;
        ledger_entry.settled = settled;
        ledger_entry.linked_tx = linked_tx;
        Ok(())
    }
}

impl Default for InMemoryEntryStore {
    fn default() -> Self {
        Self::new()
    }
}
