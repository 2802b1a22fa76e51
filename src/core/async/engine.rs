//! Ledger event processing orchestration for async batch processing
//!
//! This module provides the `AsyncLedgerEngine` struct, which orchestrates
//! event processing using thread-safe `AsyncAccountStore` and
//! `AsyncEntryStore` components.
//!
//! # Design
//!
//! The `AsyncLedgerEngine` coordinates between account storage, entry
//! storage, and the group model to process all event types. It applies the
//! same business rules as the synchronous `LedgerEngine`: conditional
//! balance writes with bounded retry, all-or-nothing settlements, and
//! exact reversals.
//!
//! # Architecture
//!
//! ```text
//! AsyncLedgerEngine
//!     ├── Arc<AsyncAccountStore>  (thread-safe balances and records)
//!     ├── Arc<AsyncEntryStore>    (thread-safe ledger entries)
//!     └── Arc<Mutex<Group>>       (member set and expenses)
//! ```
//!
//! # Thread Safety
//!
//! The engine is cloneable and can be safely shared across multiple async
//! tasks. Balance writes go through the store's compare-and-swap, so two
//! tasks racing on the same account cannot both succeed from the same
//! prior; the loser retries with a fresh read, up to a bound.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use super::{AsyncAccountStore, AsyncEntryStore};
use crate::core::group::Group;
use crate::types::{
    Account, Direction, EntryId, EntryKind, EventRecord, EventType, LedgerEntry, LedgerError,
    MemberId, SplitPolicy, TransactionRecord, Transfer, TxId,
};

/// Maximum attempts for a conditional balance write
///
/// Matches the synchronous engine: a write that keeps losing the
/// compare-and-swap race is retried with a fresh read each attempt, and
/// the conflict surfaces once this bound is reached.
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Ledger event processing orchestrator for async batch processing
///
/// `AsyncLedgerEngine` coordinates event processing across thread-safe
/// account and entry storage. It can be cloned and shared across multiple
/// async tasks for concurrent processing; batch partitioning keeps each
/// member's events sequential, so per-member ordering holds even under
/// concurrency.
#[derive(Debug, Clone)]
pub struct AsyncLedgerEngine {
    /// Thread-safe account balances and transaction records
    account_store: Arc<AsyncAccountStore>,

    /// Thread-safe ledger entry store
    entry_store: Arc<AsyncEntryStore>,

    /// Member set and recorded expenses
    ///
    /// Membership and expense events mutate shared group state; the
    /// critical sections are short (an insert or a push).
    group: Arc<Mutex<Group>>,

    /// How settlement divides expenses among members
    split_policy: SplitPolicy,

    /// Next candidate ID for settlement transactions
    next_tx: Arc<AtomicU32>,
}

impl AsyncLedgerEngine {
    /// Create a new AsyncLedgerEngine
    ///
    /// # Arguments
    ///
    /// * `account_store` - Arc-wrapped AsyncAccountStore for balances and records
    /// * `entry_store` - Arc-wrapped AsyncEntryStore for ledger entries
    /// * `split_policy` - How settlement divides expenses among members
    pub fn new(
        account_store: Arc<AsyncAccountStore>,
        entry_store: Arc<AsyncEntryStore>,
        split_policy: SplitPolicy,
    ) -> Self {
        Self {
            account_store,
            entry_store,
            group: Arc::new(Mutex::new(Group::new())),
            split_policy,
            next_tx: Arc::new(AtomicU32::new(1)),
        }
    }

    /// Process a single event record
    ///
    /// Routes the event to the appropriate handler based on event type.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing for the event type
    /// or the underlying operation fails.
    pub fn process(&self, record: EventRecord) -> Result<(), LedgerError> {
        match record.event_type {
            EventType::Member => self.process_member(record),
            EventType::Expense => self.process_expense(record),
            EventType::Entry => self.process_entry(record),
            EventType::Apply => self.process_apply(record),
            EventType::Reverse => self.process_reverse(record),
            EventType::Settle => self.process_settle(record),
            EventType::Unsettle => self.process_unsettle(record),
        }
    }

    /// Apply a transaction to a member's balance
    ///
    /// Reads the balance, computes the new one, writes it conditionally,
    /// and stores a transaction record so the change can later be
    /// reversed exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction ID is a duplicate, arithmetic
    /// would overflow, or the conditional write keeps conflicting.
    pub fn apply_transaction(
        &self,
        member: MemberId,
        tx: TxId,
        amount: Decimal,
        direction: Direction,
    ) -> Result<(), LedgerError> {
        // Check for duplicate transaction ID before touching the balance
        if self.account_store.contains_transaction(tx) {
            return Err(LedgerError::duplicate_transaction(tx, member));
        }

        self.write_with_retry(member, amount, direction, "apply", false)?;

        self.account_store.create_transaction(
            tx,
            TransactionRecord {
                member,
                amount,
                direction,
            },
        )?;

        Ok(())
    }

    /// Reverse a previously applied transaction
    ///
    /// Looks up the stored record, applies the exact negated delta, and
    /// deletes the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is not found or the member
    /// doesn't match the stored record.
    pub fn reverse_transaction(&self, member: MemberId, tx: TxId) -> Result<(), LedgerError> {
        // Look up the original transaction
        let record = self
            .account_store
            .get_transaction(tx)
            .ok_or_else(|| LedgerError::transaction_not_found(tx, "reverse"))?;

        // Verify member matches
        if record.member != member {
            return Err(LedgerError::member_mismatch(
                record.member,
                member,
                "reverse",
            ));
        }

        // Exact negation of the original delta
        self.write_with_retry(
            member,
            record.amount,
            record.direction.inverse(),
            "reverse",
            false,
        )?;

        self.account_store.delete_transaction(tx);

        Ok(())
    }

    /// Settle a ledger entry against the member's balance
    ///
    /// Credits increase the balance, debts decrease it. A debt larger
    /// than the balance is rejected with `InsufficientFunds` and nothing
    /// changes. On success a transaction record is created and the entry
    /// is marked settled with a link to that transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not found, the member doesn't
    /// match, the entry is already settled, or a debt settlement exceeds
    /// the balance.
    pub fn settle_entry(&self, member: MemberId, entry: EntryId) -> Result<(), LedgerError> {
        // Look up the entry
        let ledger_entry = self
            .entry_store
            .get(entry)
            .ok_or_else(|| LedgerError::entry_not_found(entry, "settle"))?;

        // Verify member matches
        if ledger_entry.member != member {
            return Err(LedgerError::member_mismatch(
                ledger_entry.member,
                member,
                "settle",
            ));
        }

        // Verify not already settled
        if ledger_entry.settled {
            return Err(LedgerError::entry_already_settled(entry, member));
        }

        let direction = ledger_entry.kind.settlement_direction();
        let require_funds = ledger_entry.kind == EntryKind::Debt;

        // Mutate the balance first; a rejected debt leaves everything untouched
        self.write_with_retry(
            member,
            ledger_entry.amount,
            direction,
            "settle",
            require_funds,
        )?;

        let tx = self.allocate_tx();
        self.account_store.create_transaction(
            tx,
            TransactionRecord {
                member,
                amount: ledger_entry.amount,
                direction,
            },
        )?;

        // Flag the entry last, once the balance write and record exist
        self.entry_store.set_settled(entry, true, Some(tx))?;

        Ok(())
    }

    /// Undo a previous settlement
    ///
    /// Looks up the linked transaction, reverses it exactly, deletes the
    /// record, and marks the entry unsettled with the link removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not found, the member doesn't
    /// match, the entry is not settled, or the linked transaction is
    /// missing (`ReversalMismatch` - always surfaced, never ignored).
    pub fn unsettle_entry(&self, member: MemberId, entry: EntryId) -> Result<(), LedgerError> {
        // Look up the entry
        let ledger_entry = self
            .entry_store
            .get(entry)
            .ok_or_else(|| LedgerError::entry_not_found(entry, "unsettle"))?;

        // Verify member matches
        if ledger_entry.member != member {
            return Err(LedgerError::member_mismatch(
                ledger_entry.member,
                member,
                "unsettle",
            ));
        }

        // Verify it's settled
        if !ledger_entry.settled {
            return Err(LedgerError::entry_not_settled(entry, member));
        }

        // A settled entry must carry its settlement transaction
        let tx = ledger_entry
            .linked_tx
            .ok_or_else(|| LedgerError::reversal_mismatch(entry, None))?;

        let record = self
            .account_store
            .get_transaction(tx)
            .ok_or_else(|| LedgerError::reversal_mismatch(entry, Some(tx)))?;

        // Exact negation of the settlement delta; reversals never require funds
        self.write_with_retry(
            member,
            record.amount,
            record.direction.inverse(),
            "unsettle",
            false,
        )?;

        self.account_store.delete_transaction(tx);
        self.entry_store.set_settled(entry, false, None)?;

        Ok(())
    }

    /// Compute settlement transfers for the group under the engine's policy
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroupState` if the group has no members, or
    /// `StoreUnavailable` if the group state is poisoned.
    pub fn settlement(&self) -> Result<Vec<Transfer>, LedgerError> {
        let group = self.lock_group()?;
        group.settle(self.split_policy)
    }

    /// Get final account states for output, sorted by member ID
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts = self.account_store.all_accounts();
        accounts.sort_by_key(|account| account.member);
        accounts
    }

    fn process_member(&self, record: EventRecord) -> Result<(), LedgerError> {
        self.lock_group()?.add_member(record.member);
        // Members appear in the output even if nothing ever touches them
        self.account_store.get_or_create(record.member);
        Ok(())
    }

    fn process_expense(&self, record: EventRecord) -> Result<(), LedgerError> {
        let amount = record
            .amount
            .ok_or_else(|| LedgerError::missing_field("expense", record.member, "amount"))?;

        self.lock_group()?.add_expense(record.member, amount)
    }

    fn process_entry(&self, record: EventRecord) -> Result<(), LedgerError> {
        let entry = record
            .entry
            .ok_or_else(|| LedgerError::missing_field("entry", record.member, "entry"))?;
        let kind = record
            .kind
            .ok_or_else(|| LedgerError::missing_field("entry", record.member, "kind"))?;
        let amount = record
            .amount
            .ok_or_else(|| LedgerError::missing_field("entry", record.member, "amount"))?;

        self.entry_store
            .insert(entry, LedgerEntry::new(record.member, kind, amount))
    }

    fn process_apply(&self, record: EventRecord) -> Result<(), LedgerError> {
        let tx = record
            .tx
            .ok_or_else(|| LedgerError::missing_field("apply", record.member, "tx"))?;
        let amount = record
            .amount
            .ok_or_else(|| LedgerError::missing_field("apply", record.member, "amount"))?;
        let direction = record
            .direction
            .ok_or_else(|| LedgerError::missing_field("apply", record.member, "direction"))?;

        self.apply_transaction(record.member, tx, amount, direction)
    }

    fn process_reverse(&self, record: EventRecord) -> Result<(), LedgerError> {
        let tx = record
            .tx
            .ok_or_else(|| LedgerError::missing_field("reverse", record.member, "tx"))?;

        self.reverse_transaction(record.member, tx)
    }

    fn process_settle(&self, record: EventRecord) -> Result<(), LedgerError> {
        let entry = record
            .entry
            .ok_or_else(|| LedgerError::missing_field("settle", record.member, "entry"))?;

        self.settle_entry(record.member, entry)
    }

    fn process_unsettle(&self, record: EventRecord) -> Result<(), LedgerError> {
        let entry = record
            .entry
            .ok_or_else(|| LedgerError::missing_field("unsettle", record.member, "entry"))?;

        self.unsettle_entry(record.member, entry)
    }

    fn lock_group(&self) -> Result<std::sync::MutexGuard<'_, Group>, LedgerError> {
        self.group
            .lock()
            .map_err(|_| LedgerError::store_unavailable("group"))
    }

    /// Read-modify-write a balance with bounded conflict retry
    ///
    /// Each attempt reads a fresh balance, computes the new one, and
    /// writes it conditionally on the read value. A `StoreConflict` is
    /// retried up to `MAX_WRITE_ATTEMPTS`; the final conflict and every
    /// other error propagate.
    ///
    /// When `require_funds` is set, a decrease larger than the fresh
    /// balance fails with `InsufficientFunds` before anything is written.
    fn write_with_retry(
        &self,
        member: MemberId,
        amount: Decimal,
        direction: Direction,
        operation: &str,
        require_funds: bool,
    ) -> Result<(), LedgerError> {
        let mut attempts = 0;
        loop {
            let balance = self.account_store.balance(member);

            let new_balance = match direction {
                Direction::Increase => balance
                    .checked_add(amount)
                    .ok_or_else(|| LedgerError::arithmetic_overflow(operation, member))?,
                Direction::Decrease => {
                    if require_funds && balance < amount {
                        return Err(LedgerError::insufficient_funds(member, balance, amount));
                    }
                    balance
                        .checked_sub(amount)
                        .ok_or_else(|| LedgerError::arithmetic_underflow(operation, member))?
                }
            };

            match self.account_store.write_balance(member, new_balance, balance) {
                Ok(()) => return Ok(()),
                Err(LedgerError::StoreConflict { .. }) if attempts + 1 < MAX_WRITE_ATTEMPTS => {
                    attempts += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Allocate a transaction ID for a settlement
    ///
    /// Skips IDs already taken by caller-supplied transactions. The
    /// counter is shared across tasks, so two concurrent settlements
    /// never receive the same candidate.
    fn allocate_tx(&self) -> TxId {
        loop {
            let tx = self.next_tx.fetch_add(1, Ordering::SeqCst);
            if !self.account_store.contains_transaction(tx) {
                return tx;
            }
        }
    }
}
