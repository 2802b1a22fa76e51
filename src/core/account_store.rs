//! Account storage module
//!
//! This module provides the `InMemoryAccountStore` struct which maintains the
//! state of all member accounts and the transaction records that mutated them.
//!
//! The account store is responsible for:
//! - Creating new accounts on first touch
//! - Serving balance reads
//! - Conditional (compare-and-swap) balance writes
//! - Storing transaction records so balance changes can be reversed exactly
//! - Providing sorted account listings for output

use crate::core::traits::AccountStore;
use crate::types::{Account, LedgerError, MemberId, TransactionRecord, TxId};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// In-memory account and transaction record store
///
/// Maintains a map of member IDs to account states and a map of
/// transaction IDs to the records that changed those accounts.
pub struct InMemoryAccountStore {
    /// Map of member IDs to account states
    accounts: HashMap<MemberId, Account>,

    /// Map of transaction IDs to stored transaction records
    transactions: HashMap<TxId, TransactionRecord>,
}

impl InMemoryAccountStore {
    /// Create a new store with no accounts and no transactions
    pub fn new() -> Self {
        InMemoryAccountStore {
            accounts: HashMap::new(),
            transactions: HashMap::new(),
        }
    }

    /// Get or create an account for the specified member
    ///
    /// If an account already exists for the member, returns a mutable
    /// reference to it. Otherwise creates a new account with a zero balance.
    pub fn get_or_create_account(&mut self, member: MemberId) -> &mut Account {
        self.accounts
            .entry(member)
            .or_insert_with(|| Account::new(member))
    }
}

impl AccountStore for InMemoryAccountStore {
    /// Get the current balance for a member
    ///
    /// Members without an account read as zero; reads never create
    /// accounts.
    fn balance(&self, member: MemberId) -> Decimal {
        self.accounts
            .get(&member)
            .map(|account| account.balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Conditionally write a member's balance
    ///
    /// Succeeds only when the stored balance still equals `expected_prior`.
    /// A mismatch means another writer got in between the caller's read and
    /// this write; the store is left untouched and `StoreConflict` is
    /// returned so the caller can re-read and retry.
    ///
    /// # Errors
    ///
    /// Returns `StoreConflict` if the stored balance differs from
    /// `expected_prior`.
    fn write_balance(
        &mut self,
        member: MemberId,
        new_balance: Decimal,
        expected_prior: Decimal,
    ) -> Result<(), LedgerError> {
        let account = self.get_or_create_account(member);

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
    fn create_transaction(
        &mut self,
        tx: TxId,
        record: TransactionRecord,
    ) -> Result<(), LedgerError> {
        if self.transactions.contains_key(&tx) {
            return Err(LedgerError::duplicate_transaction(tx, record.member));
        }

        self.transactions.insert(tx, record);
        Ok(())
    }

    /// Get a transaction record by ID
    fn get_transaction(&self, tx: TxId) -> Option<TransactionRecord> {
        self.transactions.get(&tx).cloned()
    }

    /// Delete a transaction record, returning it if it existed
    fn delete_transaction(&mut self, tx: TxId) -> Option<TransactionRecord> {
        self.transactions.remove(&tx)
    }

    /// Get all accounts sorted by member ID
    ///
    /// Sorted output keeps CSV generation deterministic.
    fn all_accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.values().cloned().collect();
        accounts.sort_by_key(|account| account.member);
        accounts
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use rust_decimal::Decimal;

    #[test]
    fn test_new_creates_empty_store() {
        let store = InMemoryAccountStore::new();
        assert_eq!(store.all_accounts().len(), 0);
        assert_eq!(store.balance(1), Decimal::ZERO);
    }

    #[test]
    fn test_get_or_create_account_creates_new_account() {
        let mut store = InMemoryAccountStore::new();

        let account = store.get_or_create_account(1);

        assert_eq!(account.member, 1);
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn test_balance_read_does_not_create_account() {
        let store = InMemoryAccountStore::new();

        assert_eq!(store.balance(7), Decimal::ZERO);
        assert_eq!(store.all_accounts().len(), 0);
    }

    #[test]
    fn test_write_balance_with_matching_prior_succeeds() {
        let mut store = InMemoryAccountStore::new();

        // 100.00 from a prior of 0.00
        let result = store.write_balance(1, Decimal::new(10000, 2), Decimal::ZERO);
        assert!(result.is_ok());
        assert_eq!(store.balance(1), Decimal::new(10000, 2));
    }

    #[test]
    fn test_write_balance_with_stale_prior_conflicts() {
        let mut store = InMemoryAccountStore::new();

        store
            .write_balance(1, Decimal::new(10000, 2), Decimal::ZERO)
            .unwrap();

        // Writer still believes the balance is 0.00
        let result = store.write_balance(1, Decimal::new(5000, 2), Decimal::ZERO);

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::StoreConflict { .. }
        ));

        // Store unchanged on conflict
        assert_eq!(store.balance(1), Decimal::new(10000, 2));
    }

    #[test]
    fn test_write_balance_sequence() {
        let mut store = InMemoryAccountStore::new();

        store
            .write_balance(1, Decimal::new(10000, 2), Decimal::ZERO)
            .unwrap();
        store
            .write_balance(1, Decimal::new(25000, 2), Decimal::new(10000, 2))
            .unwrap();
        store
            .write_balance(1, Decimal::new(20000, 2), Decimal::new(25000, 2))
            .unwrap();

        assert_eq!(store.balance(1), Decimal::new(20000, 2));
    }

    #[test]
    fn test_write_balance_for_multiple_members() {
        let mut store = InMemoryAccountStore::new();

        store
            .write_balance(1, Decimal::new(10000, 2), Decimal::ZERO)
            .unwrap();
        store
            .write_balance(2, Decimal::new(20000, 2), Decimal::ZERO)
            .unwrap();
        store
            .write_balance(3, Decimal::new(30000, 2), Decimal::ZERO)
            .unwrap();

        assert_eq!(store.balance(1), Decimal::new(10000, 2));
        assert_eq!(store.balance(2), Decimal::new(20000, 2));
        assert_eq!(store.balance(3), Decimal::new(30000, 2));
    }

    #[test]
    fn test_create_and_get_transaction() {
        let mut store = InMemoryAccountStore::new();

        let record = TransactionRecord {
            member: 1,
            amount: Decimal::new(20000, 2),
            direction: Direction::Increase,
        };
        store.create_transaction(10, record.clone()).unwrap();

        assert_eq!(store.get_transaction(10), Some(record));
        assert_eq!(store.get_transaction(11), None);
    }

    #[test]
    fn test_create_duplicate_transaction_rejected() {
        let mut store = InMemoryAccountStore::new();

        let record = TransactionRecord {
            member: 1,
            amount: Decimal::new(20000, 2),
            direction: Direction::Increase,
        };
        store.create_transaction(10, record.clone()).unwrap();

        let duplicate = TransactionRecord {
            member: 2,
            amount: Decimal::new(5000, 2),
            direction: Direction::Decrease,
        };
        let result = store.create_transaction(10, duplicate);

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::DuplicateTransaction { .. }
        ));

        // Original record preserved
        assert_eq!(store.get_transaction(10), Some(record));
    }

    #[test]
    fn test_delete_transaction_returns_record() {
        let mut store = InMemoryAccountStore::new();

        let record = TransactionRecord {
            member: 1,
            amount: Decimal::new(20000, 2),
            direction: Direction::Decrease,
        };
        store.create_transaction(10, record.clone()).unwrap();

        assert_eq!(store.delete_transaction(10), Some(record));
        assert_eq!(store.get_transaction(10), None);
        assert_eq!(store.delete_transaction(10), None);
    }

    #[test]
    fn test_all_accounts_sorted_by_member() {
        let mut store = InMemoryAccountStore::new();

        store.get_or_create_account(3);
        store.get_or_create_account(1);
        store.get_or_create_account(2);

        let accounts = store.all_accounts();
        let members: Vec<u16> = accounts.iter().map(|a| a.member).collect();
        assert_eq!(members, vec![1, 2, 3]);
    }
}
