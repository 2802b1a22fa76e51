//! Thread-safe account storage for async batch processing
//!
//! This module provides the `AsyncAccountStore` struct, which manages account
//! states and transaction records using concurrent data structures to enable
//! safe multi-threaded access.
//!
//! # Design
//!
//! The `AsyncAccountStore` uses `DashMap` (a concurrent HashMap) to provide
//! thread-safe storage with fine-grained locking. The conditional balance
//! write compares the expected prior balance inside the entry lock, so
//! concurrent writers to the same account serialize through the
//! compare-and-swap: one wins, the others observe `StoreConflict` and retry
//! with a fresh read.
//!
//! # Thread Safety
//!
//! All operations are thread-safe and prevent data races through DashMap's
//! internal synchronization. Operations on different accounts proceed in
//! parallel; operations on the same account are serialized by the CAS.

use crate::types::{Account, LedgerError, MemberId, TransactionRecord, TxId};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Thread-safe account and transaction record store
///
/// Provides concurrent access to account balances and transaction records
/// using `DashMap` for fine-grained locking. Multiple threads can safely
/// touch different accounts simultaneously, while writes to the same
/// account are arbitrated by the conditional write.
#[derive(Debug)]
pub struct AsyncAccountStore {
    /// Concurrent map of member ID to account state
    accounts: DashMap<MemberId, Account>,

    /// Concurrent map of transaction ID to stored record
    transactions: DashMap<TxId, TransactionRecord>,
}

impl AsyncAccountStore {
    /// Create a new empty AsyncAccountStore
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            transactions: DashMap::new(),
        }
    }

    /// Get an existing account or create a new one if it doesn't exist
    ///
    /// Returns a clone: a snapshot at the time of the call. Concurrent
    /// modifications by other threads won't be reflected in the returned
    /// value.
    pub fn get_or_create(&self, member: MemberId) -> Account {
        self.accounts
            .entry(member)
            .or_insert_with(|| Account::new(member))
            .clone()
    }

    /// Get the current balance for a member (zero if no account exists)
    ///
    /// The returned value is a snapshot; callers that intend to write
    /// should pass it to `write_balance` as the expected prior balance
    /// and be prepared to retry on conflict.
    pub fn balance(&self, member: MemberId) -> Decimal {
        self.accounts
            .get(&member)
            .map(|account| account.balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Conditionally write a member's balance
    ///
    /// The comparison and the write happen while holding the account's
    /// entry lock, so two writers racing on the same account cannot both
    /// succeed against the same prior balance.
    ///
    /// # Errors
    ///
    /// Returns `StoreConflict` if the stored balance no longer equals
    /// `expected_prior`. The store is left unchanged.
    pub fn write_balance(
        &self,
        member: MemberId,
        new_balance: Decimal,
        expected_prior: Decimal,
    ) -> Result<(), LedgerError> {
        let mut entry = self
            .accounts
            .entry(member)
            .or_insert_with(|| Account::new(member));

        let account = entry.value_mut();
        if account.balance != expected_prior {
            return Err(LedgerError::store_conflict(
                member,
                expected_prior,
                account.balance,
            ));
        }

        account.balance = new_balance;
        Ok(())
    }

    /// Store a transaction record under a unique ID
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTransaction` if a record with this ID already
    /// exists. The existing record is kept.
    pub fn create_transaction(
        &self,
        tx: TxId,
        record: TransactionRecord,
    ) -> Result<(), LedgerError> {
        match self.transactions.entry(tx) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(LedgerError::duplicate_transaction(tx, record.member))
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(record);
                Ok(())
            }
        }
    }

    /// Get a transaction record by ID
    pub fn get_transaction(&self, tx: TxId) -> Option<TransactionRecord> {
        self.transactions.get(&tx).map(|entry| entry.clone())
    }

    /// Check whether a transaction record exists
    pub fn contains_transaction(&self, tx: TxId) -> bool {
        self.transactions.contains_key(&tx)
    }

    /// Delete a transaction record, returning it if it existed
    pub fn delete_transaction(&self, tx: TxId) -> Option<TransactionRecord> {
        self.transactions.remove(&tx).map(|(_, record)| record)
    }

    /// Get all accounts for final output
    ///
    /// Returns a snapshot in arbitrary order; output formatting sorts by
    /// member ID.
    pub fn all_accounts(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for AsyncAccountStore {
    fn default() -> Self {
        Self::new()
    }
}
