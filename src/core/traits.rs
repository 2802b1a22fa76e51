//! Core traits for account storage, entry storage, and engine operations
//!
//! This module defines the trait abstractions that allow both synchronous and
//! asynchronous implementations to be used interchangeably. All collaborator
//! state lives behind these seams; nothing in the crate reaches for global
//! mutable state.

use crate::types::{
    Account, EntryId, EventRecord, LedgerEntry, LedgerError, MemberId, TransactionRecord, TxId,
};
use rust_decimal::Decimal;

/// Trait for account and transaction record storage
///
/// Provides balance reads, conditional balance writes, and transaction
/// record bookkeeping. Implementations can be synchronous (using HashMap)
/// or asynchronous (using DashMap).
pub trait AccountStore {
    /// Get the current balance for a member (zero if no account exists)
    fn balance(&self, member: MemberId) -> Decimal;

    /// Conditionally write a member's balance
    ///
    /// The write succeeds only if the stored balance still equals
    /// `expected_prior`; otherwise the store returns `StoreConflict`
    /// and remains unchanged. This is the compare-and-swap that gives
    /// per-account serializability.
    fn write_balance(
        &mut self,
        member: MemberId,
        new_balance: Decimal,
        expected_prior: Decimal,
    ) -> Result<(), LedgerError>;

    /// Store a transaction record under a unique ID
    fn create_transaction(
        &mut self,
        tx: TxId,
        record: TransactionRecord,
    ) -> Result<(), LedgerError>;

    /// Get a transaction record by ID
    fn get_transaction(&self, tx: TxId) -> Option<TransactionRecord>;

    /// Delete a transaction record, returning it if it existed
    fn delete_transaction(&mut self, tx: TxId) -> Option<TransactionRecord>;

    /// Get all accounts for final output
    fn all_accounts(&self) -> Vec<Account>;
}

/// Trait for ledger entry storage
///
/// Provides entry lookups and the settled-flag transition recorded by
/// settlement and unsettlement.
pub trait EntryStore {
    /// Store an entry under a unique ID
    fn insert(&mut self, entry: EntryId, ledger_entry: LedgerEntry) -> Result<(), LedgerError>;

    /// Get an entry by ID
    fn get(&self, entry: EntryId) -> Option<LedgerEntry>;

    /// Update an entry's settled flag and transaction link
    ///
    /// Written only after the balance mutation and transaction record
    /// bookkeeping have succeeded, so a failed settlement never leaves
    /// a flagged entry behind.
    fn set_settled(
        &mut self,
        entry: EntryId,
        settled: bool,
        linked_tx: Option<TxId>,
    ) -> Result<(), LedgerError>;
}

/// Trait for processing ledger events
///
/// Provides the main event processing interface that coordinates between
/// account storage, entry storage, and the group model.
pub trait LedgerProcessor {
    /// Process a single event record
    fn process(&mut self, record: EventRecord) -> Result<(), LedgerError>;

    /// Get all accounts for output
    fn accounts(&self) -> Vec<Account>;
}
