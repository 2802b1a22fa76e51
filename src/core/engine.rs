//! Ledger event processing engine
//!
//! This module provides the LedgerEngine that orchestrates event processing
//! by coordinating between the account store, entry store, and group model.
//!
//! The engine enforces business rules such as:
//! - Member validation (entries, reversals, and settlements must name the
//!   owning member)
//! - Proper settlement lifecycle (settle -> unsettle, exact reversal)
//! - All-or-nothing settlement: the entry is flagged only after the balance
//!   write and transaction record both succeed
//! - Bounded retry of conditional balance writes that lose a race

use crate::core::account_store::InMemoryAccountStore;
use crate::core::entry_store::InMemoryEntryStore;
use crate::core::group::Group;
use crate::core::traits::{AccountStore, EntryStore, LedgerProcessor};
use crate::types::{
    Account, Direction, EntryId, EntryKind, EventRecord, EventType, LedgerEntry, LedgerError,
    MemberId, SplitPolicy, TransactionRecord, Transfer, TxId,
};
use rust_decimal::Decimal;

/// Maximum attempts for a conditional balance write
///
/// A write that keeps losing the compare-and-swap race is retried with a
/// fresh balance read each attempt; the conflict surfaces to the caller
/// once this bound is reached.
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Ledger event processing engine
///
/// Orchestrates event processing by coordinating between the account
/// store, the entry store, and the group model. Enforces business rules
/// and maintains ledger invariants.
pub struct LedgerEngine {
    account_store: InMemoryAccountStore,
    entry_store: InMemoryEntryStore,
    group: Group,
    split_policy: SplitPolicy,
    next_tx: TxId,
}

impl LedgerEngine {
    /// Create a new LedgerEngine with the given split policy
    ///
    /// Initializes an empty engine with no accounts, entries, or expenses.
    pub fn new(split_policy: SplitPolicy) -> Self {
        LedgerEngine {
            account_store: InMemoryAccountStore::new(),
            entry_store: InMemoryEntryStore::new(),
            group: Group::new(),
            split_policy,
            next_tx: 1,
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
    pub fn process(&mut self, record: EventRecord) -> Result<(), LedgerError> {
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
        &mut self,
        member: MemberId,
        tx: TxId,
        amount: Decimal,
        direction: Direction,
    ) -> Result<(), LedgerError> {
        // Check for duplicate transaction ID before touching the balance
        if self.account_store.get_transaction(tx).is_some() {
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
    pub fn reverse_transaction(&mut self, member: MemberId, tx: TxId) -> Result<(), LedgerError> {
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
    pub fn settle_entry(&mut self, member: MemberId, entry: EntryId) -> Result<(), LedgerError> {
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
    pub fn unsettle_entry(&mut self, member: MemberId, entry: EntryId) -> Result<(), LedgerError> {
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
    /// Pure with respect to account and entry state; computing transfers
    /// mutates nothing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroupState` if the group has no members.
    pub fn settlement(&self) -> Result<Vec<Transfer>, LedgerError> {
        self.group.settle(self.split_policy)
    }

    /// Get final account states for output
    ///
    /// Returns all accounts created during processing, sorted by member ID.
    pub fn accounts(&self) -> Vec<Account> {
        self.account_store.all_accounts()
    }

    fn process_member(&mut self, record: EventRecord) -> Result<(), LedgerError> {
        self.group.add_member(record.member);
        // Members appear in the output even if nothing ever touches them
        self.account_store.get_or_create_account(record.member);
        Ok(())
    }

    fn process_expense(&mut self, record: EventRecord) -> Result<(), LedgerError> {
        let amount = record
            .amount
            .ok_or_else(|| LedgerError::missing_field("expense", record.member, "amount"))?;

        self.group.add_expense(record.member, amount)
    }

    fn process_entry(&mut self, record: EventRecord) -> Result<(), LedgerError> {
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

    fn process_apply(&mut self, record: EventRecord) -> Result<(), LedgerError> {
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

    fn process_reverse(&mut self, record: EventRecord) -> Result<(), LedgerError> {
        let tx = record
            .tx
            .ok_or_else(|| LedgerError::missing_field("reverse", record.member, "tx"))?;

        self.reverse_transaction(record.member, tx)
    }

    fn process_settle(&mut self, record: EventRecord) -> Result<(), LedgerError> {
        let entry = record
            .entry
            .ok_or_else(|| LedgerError::missing_field("settle", record.member, "entry"))?;

        self.settle_entry(record.member, entry)
    }

    fn process_unsettle(&mut self, record: EventRecord) -> Result<(), LedgerError> {
        let entry = record
            .entry
            .ok_or_else(|| LedgerError::missing_field("unsettle", record.member, "entry"))?;

        self.unsettle_entry(record.member, entry)
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
        &mut self,
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
    /// Skips IDs already taken by caller-supplied transactions.
    fn allocate_tx(&mut self) -> TxId {
        while self.account_store.get_transaction(self.next_tx).is_some() {
            self.next_tx = self.next_tx.wrapping_add(1);
        }
        let tx = self.next_tx;
        self.next_tx = self.next_tx.wrapping_add(1);
        tx
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new(SplitPolicy::CurrentMembers)
    }
}

impl LedgerProcessor for LedgerEngine {
    fn process(&mut self, record: EventRecord) -> Result<(), LedgerError> {
        LedgerEngine::process(self, record)
    }

    fn accounts(&self) -> Vec<Account> {
        LedgerEngine::accounts(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn event(event_type: EventType, member: MemberId) -> EventRecord {
        EventRecord {
            event_type,
            member,
            entry: None,
            tx: None,
            amount: None,
            direction: None,
            kind: None,
        }
    }

    fn apply_event(member: MemberId, tx: TxId, cents: i64, direction: Direction) -> EventRecord {
        EventRecord {
            tx: Some(tx),
            amount: Some(Decimal::new(cents, 2)),
            direction: Some(direction),
            ..event(EventType::Apply, member)
        }
    }

    fn entry_event(member: MemberId, entry: EntryId, kind: EntryKind, cents: i64) -> EventRecord {
        EventRecord {
            entry: Some(entry),
            amount: Some(Decimal::new(cents, 2)),
            kind: Some(kind),
            ..event(EventType::Entry, member)
        }
    }

    fn balance_of(engine: &LedgerEngine, member: MemberId) -> Decimal {
        engine
            .accounts()
            .into_iter()
            .find(|a| a.member == member)
            .map(|a| a.balance)
            .unwrap_or(Decimal::ZERO)
    }

    #[test]
    fn test_apply_increase_creates_account() {
        let mut engine = LedgerEngine::default();

        let result = engine.process(apply_event(1, 1, 10000, Direction::Increase));
        assert!(result.is_ok());

        assert_eq!(balance_of(&engine, 1), Decimal::new(10000, 2));
    }

    #[test]
    fn test_apply_decrease_subtracts() {
        let mut engine = LedgerEngine::default();

        engine
            .process(apply_event(1, 1, 20000, Direction::Increase))
            .unwrap();
        engine
            .process(apply_event(1, 2, 5000, Direction::Decrease))
            .unwrap();

        assert_eq!(balance_of(&engine, 1), Decimal::new(15000, 2));
    }

    #[test]
    fn test_apply_decrease_may_go_negative() {
        // Direct application is not a debt settlement; no funds check
        let mut engine = LedgerEngine::default();

        engine
            .process(apply_event(1, 1, 5000, Direction::Decrease))
            .unwrap();

        assert_eq!(balance_of(&engine, 1), Decimal::new(-5000, 2));
    }

    #[test]
    fn test_apply_without_amount_fails() {
        let mut engine = LedgerEngine::default();

        let result = engine.process(EventRecord {
            tx: Some(1),
            direction: Some(Direction::Increase),
            ..event(EventType::Apply, 1)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::MissingField { .. }
        ));
    }

    #[test]
    fn test_apply_duplicate_tx_rejected() {
        let mut engine = LedgerEngine::default();

        engine
            .process(apply_event(1, 1, 10000, Direction::Increase))
            .unwrap();

        let result = engine.process(apply_event(1, 1, 5000, Direction::Increase));

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::DuplicateTransaction { .. }
        ));

        // Balance unchanged by the rejected duplicate
        assert_eq!(balance_of(&engine, 1), Decimal::new(10000, 2));
    }

    #[test]
    fn test_reverse_applies_exact_negated_delta() {
        let mut engine = LedgerEngine::default();

        engine
            .process(apply_event(1, 1, 12345, Direction::Increase))
            .unwrap();
        engine.process(event(EventType::Reverse, 1)).unwrap_err(); // missing tx

        engine
            .process(EventRecord {
                tx: Some(1),
                ..event(EventType::Reverse, 1)
            })
            .unwrap();

        assert_eq!(balance_of(&engine, 1), Decimal::ZERO);
    }

    #[test]
    fn test_reverse_nonexistent_transaction() {
        let mut engine = LedgerEngine::default();

        let result = engine.process(EventRecord {
            tx: Some(999),
            ..event(EventType::Reverse, 1)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::TransactionNotFound { .. }
        ));
    }

    #[test]
    fn test_reverse_with_member_mismatch() {
        let mut engine = LedgerEngine::default();

        engine
            .process(apply_event(1, 1, 10000, Direction::Increase))
            .unwrap();

        let result = engine.process(EventRecord {
            tx: Some(1),
            ..event(EventType::Reverse, 2)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::MemberMismatch { .. }
        ));
    }

    #[test]
    fn test_reversed_transaction_cannot_be_reversed_again() {
        let mut engine = LedgerEngine::default();

        engine
            .process(apply_event(1, 1, 10000, Direction::Increase))
            .unwrap();
        engine
            .process(EventRecord {
                tx: Some(1),
                ..event(EventType::Reverse, 1)
            })
            .unwrap();

        // Record was deleted by the reversal
        let result = engine.process(EventRecord {
            tx: Some(1),
            ..event(EventType::Reverse, 1)
        });
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::TransactionNotFound { .. }
        ));
    }

    #[test]
    fn test_settle_credit_increases_balance() {
        let mut engine = LedgerEngine::default();

        // Balance 1000.00, credit entry of 200.00
        engine
            .process(apply_event(1, 1, 100000, Direction::Increase))
            .unwrap();
        engine
            .process(entry_event(1, 1, EntryKind::Credit, 20000))
            .unwrap();

        engine
            .process(EventRecord {
                entry: Some(1),
                ..event(EventType::Settle, 1)
            })
            .unwrap();

        assert_eq!(balance_of(&engine, 1), Decimal::new(120000, 2));
    }

    #[test]
    fn test_settle_debt_decreases_balance() {
        let mut engine = LedgerEngine::default();

        engine
            .process(apply_event(1, 1, 100000, Direction::Increase))
            .unwrap();
        engine
            .process(entry_event(1, 1, EntryKind::Debt, 30000))
            .unwrap();

        engine
            .process(EventRecord {
                entry: Some(1),
                ..event(EventType::Settle, 1)
            })
            .unwrap();

        assert_eq!(balance_of(&engine, 1), Decimal::new(70000, 2));
    }

    #[test]
    fn test_settle_debt_with_insufficient_funds_changes_nothing() {
        let mut engine = LedgerEngine::default();

        // Balance 400.00, debt of 500.00
        engine
            .process(apply_event(1, 1, 40000, Direction::Increase))
            .unwrap();
        engine
            .process(entry_event(1, 1, EntryKind::Debt, 50000))
            .unwrap();

        let result = engine.process(EventRecord {
            entry: Some(1),
            ..event(EventType::Settle, 1)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::InsufficientFunds { .. }
        ));

        // Balance untouched, entry still unsettled with no link
        assert_eq!(balance_of(&engine, 1), Decimal::new(40000, 2));
        let entry = engine.entry_store.get(1).unwrap();
        assert!(!entry.settled);
        assert_eq!(entry.linked_tx, None);
    }

    #[test]
    fn test_settle_nonexistent_entry() {
        let mut engine = LedgerEngine::default();

        let result = engine.process(EventRecord {
            entry: Some(999),
            ..event(EventType::Settle, 1)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::EntryNotFound { .. }
        ));
    }

    #[test]
    fn test_settle_with_member_mismatch() {
        let mut engine = LedgerEngine::default();

        engine
            .process(entry_event(1, 1, EntryKind::Credit, 10000))
            .unwrap();

        let result = engine.process(EventRecord {
            entry: Some(1),
            ..event(EventType::Settle, 2)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::MemberMismatch { .. }
        ));
    }

    #[test]
    fn test_settle_already_settled_entry() {
        let mut engine = LedgerEngine::default();

        engine
            .process(entry_event(1, 1, EntryKind::Credit, 10000))
            .unwrap();
        engine
            .process(EventRecord {
                entry: Some(1),
                ..event(EventType::Settle, 1)
            })
            .unwrap();

        let result = engine.process(EventRecord {
            entry: Some(1),
            ..event(EventType::Settle, 1)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::EntryAlreadySettled { .. }
        ));

        // The first settlement stands
        assert_eq!(balance_of(&engine, 1), Decimal::new(10000, 2));
    }

    #[test]
    fn test_settle_then_unsettle_restores_balance_exactly() {
        let mut engine = LedgerEngine::default();

        // Balance 1000.00, credit of 200.00: settle to 1200.00, unsettle back
        engine
            .process(apply_event(1, 1, 100000, Direction::Increase))
            .unwrap();
        engine
            .process(entry_event(1, 1, EntryKind::Credit, 20000))
            .unwrap();

        engine
            .process(EventRecord {
                entry: Some(1),
                ..event(EventType::Settle, 1)
            })
            .unwrap();
        assert_eq!(balance_of(&engine, 1), Decimal::new(120000, 2));

        let settled = engine.entry_store.get(1).unwrap();
        assert!(settled.settled);
        assert!(settled.linked_tx.is_some());

        engine
            .process(EventRecord {
                entry: Some(1),
                ..event(EventType::Unsettle, 1)
            })
            .unwrap();

        // Bit-for-bit restoration, same scale
        assert_eq!(balance_of(&engine, 1), Decimal::new(100000, 2));

        let unsettled = engine.entry_store.get(1).unwrap();
        assert!(!unsettled.settled);
        assert_eq!(unsettled.linked_tx, None);
    }

    #[test]
    fn test_unsettle_not_settled_entry() {
        let mut engine = LedgerEngine::default();

        engine
            .process(entry_event(1, 1, EntryKind::Debt, 10000))
            .unwrap();

        let result = engine.process(EventRecord {
            entry: Some(1),
            ..event(EventType::Unsettle, 1)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::EntryNotSettled { .. }
        ));
    }

    #[test]
    fn test_unsettle_with_missing_linked_transaction_surfaces_mismatch() {
        let mut engine = LedgerEngine::default();

        engine
            .process(entry_event(1, 1, EntryKind::Credit, 10000))
            .unwrap();
        engine
            .process(EventRecord {
                entry: Some(1),
                ..event(EventType::Settle, 1)
            })
            .unwrap();

        // Yank the settlement transaction out from under the entry
        let linked = engine.entry_store.get(1).unwrap().linked_tx.unwrap();
        engine.account_store.delete_transaction(linked);

        let result = engine.process(EventRecord {
            entry: Some(1),
            ..event(EventType::Unsettle, 1)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::ReversalMismatch { .. }
        ));
    }

    #[test]
    fn test_settle_unsettle_settle_cycle() {
        let mut engine = LedgerEngine::default();

        engine
            .process(apply_event(1, 1, 50000, Direction::Increase))
            .unwrap();
        engine
            .process(entry_event(1, 1, EntryKind::Debt, 20000))
            .unwrap();

        for _ in 0..3 {
            engine
                .process(EventRecord {
                    entry: Some(1),
                    ..event(EventType::Settle, 1)
                })
                .unwrap();
            assert_eq!(balance_of(&engine, 1), Decimal::new(30000, 2));

            engine
                .process(EventRecord {
                    entry: Some(1),
                    ..event(EventType::Unsettle, 1)
                })
                .unwrap();
            assert_eq!(balance_of(&engine, 1), Decimal::new(50000, 2));
        }
    }

    #[test]
    fn test_settlement_allocates_fresh_tx_ids() {
        let mut engine = LedgerEngine::default();

        // Caller-supplied transaction occupies ID 1
        engine
            .process(apply_event(1, 1, 100000, Direction::Increase))
            .unwrap();
        engine
            .process(entry_event(1, 1, EntryKind::Credit, 10000))
            .unwrap();
        engine
            .process(EventRecord {
                entry: Some(1),
                ..event(EventType::Settle, 1)
            })
            .unwrap();

        let linked = engine.entry_store.get(1).unwrap().linked_tx.unwrap();
        assert_ne!(linked, 1);
    }

    #[test]
    fn test_member_event_creates_account() {
        let mut engine = LedgerEngine::default();

        engine.process(event(EventType::Member, 1)).unwrap();

        let accounts = engine.accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].member, 1);
        assert_eq!(accounts[0].balance, Decimal::ZERO);
    }

    #[test]
    fn test_expense_requires_membership() {
        let mut engine = LedgerEngine::default();

        engine.process(event(EventType::Member, 1)).unwrap();

        let result = engine.process(EventRecord {
            amount: Some(Decimal::new(10000, 2)),
            ..event(EventType::Expense, 2)
        });

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::InvalidGroupState { .. }
        ));
    }

    #[test]
    fn test_settlement_for_single_payer_group() {
        let mut engine = LedgerEngine::default();

        for m in [1, 2, 3] {
            engine.process(event(EventType::Member, m)).unwrap();
        }
        engine
            .process(EventRecord {
                amount: Some(Decimal::new(30000, 2)),
                ..event(EventType::Expense, 1)
            })
            .unwrap();

        let transfers = engine.settlement().unwrap();
        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.to == 1));
        assert!(transfers
            .iter()
            .all(|t| t.amount == Decimal::new(10000, 2)));
    }

    #[test]
    fn test_settlement_of_empty_group_rejected() {
        let engine = LedgerEngine::default();

        let result = engine.settlement();
        assert!(matches!(
            result.unwrap_err(),
            LedgerError::InvalidGroupState { .. }
        ));
    }

    #[test]
    fn test_multiple_members_independent_accounts() {
        let mut engine = LedgerEngine::default();

        engine
            .process(apply_event(1, 1, 10000, Direction::Increase))
            .unwrap();
        engine
            .process(apply_event(2, 2, 20000, Direction::Increase))
            .unwrap();

        let accounts = engine.accounts();
        assert_eq!(accounts.len(), 2);
        assert_eq!(balance_of(&engine, 1), Decimal::new(10000, 2));
        assert_eq!(balance_of(&engine, 2), Decimal::new(20000, 2));
    }
}
