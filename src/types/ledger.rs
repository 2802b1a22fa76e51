//! Ledger-related types for the Group Ledger
//!
//! This module defines the event, entry, and transaction types used
//! throughout the system for mutating member accounts and settling
//! ledger entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;

/// Member identifier
///
/// Supports member IDs from 0 to 65,535
pub type MemberId = u16;

/// Ledger entry identifier
///
/// Supports entry IDs from 0 to 4,294,967,295
pub type EntryId = u32;

/// Transaction identifier
///
/// Supports transaction IDs from 0 to 4,294,967,295
pub type TxId = u32;

/// Event types accepted by the ledger engine
///
/// Each variant represents a different operation. Expense and member
/// events build the group model used by settlement, while apply,
/// reverse, settle, and unsettle mutate member account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Add a member to the group
    ///
    /// Creates an account with zero balance if one doesn't exist.
    /// Membership determines who shares in group expenses.
    Member,

    /// Record a group expense paid by one member
    ///
    /// The payer must already be a member. The member set at the time
    /// the expense is recorded is captured for snapshot splitting.
    Expense,

    /// Declare a ledger entry (a debt or credit) for a member
    ///
    /// Entries start unsettled and are later settled or unsettled by
    /// ID. Declaring an entry does not touch the balance.
    Entry,

    /// Apply a transaction directly to a member's balance
    ///
    /// Increases or decreases the balance by the given amount and
    /// stores a transaction record for later reversal.
    Apply,

    /// Reverse a previously applied transaction
    ///
    /// Applies the exact negated delta and deletes the stored record.
    /// References an existing transaction by ID.
    Reverse,

    /// Settle a ledger entry against the member's balance
    ///
    /// Credits increase the balance, debts decrease it. Marks the entry
    /// settled and links it to the transaction that settled it.
    Settle,

    /// Undo a previous settlement
    ///
    /// Reverses the linked transaction, removes the link, and marks
    /// the entry unsettled again.
    Unsettle,
}

/// Direction of a balance mutation
///
/// Closed set: every balance write is exactly one of these, and all
/// matches over it are exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Add the amount to the balance
    Increase,

    /// Subtract the amount from the balance
    Decrease,
}

impl Direction {
    /// The direction that exactly undoes this one
    pub fn inverse(self) -> Self {
        match self {
            Direction::Increase => Direction::Decrease,
            Direction::Decrease => Direction::Increase,
        }
    }
}

/// Kind of a ledger entry
///
/// Determines the settlement direction: settling a credit increases
/// the member's balance, settling a debt decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// The member owes this amount; settling pays it out of the balance
    Debt,

    /// The member is owed this amount; settling pays it into the balance
    Credit,
}

impl EntryKind {
    /// The balance direction settlement of this kind produces
    pub fn settlement_direction(self) -> Direction {
        match self {
            EntryKind::Credit => Direction::Increase,
            EntryKind::Debt => Direction::Decrease,
        }
    }
}

/// Input event record from CSV
///
/// Represents a single event as read from the input CSV file. The
/// amount field is optional because reverse, settle, unsettle, and
/// member events reference existing state and don't specify amounts.
#[derive(Debug, Clone)]
pub struct EventRecord {
    /// The type of event
    pub event_type: EventType,

    /// The member ID this event applies to (u16: 0-65,535)
    ///
    /// For expense events this is the payer.
    pub member: MemberId,

    /// Ledger entry identifier
    ///
    /// Required for entry, settle, and unsettle events.
    pub entry: Option<EntryId>,

    /// Transaction identifier
    ///
    /// Required for apply and reverse events.
    pub tx: Option<TxId>,

    /// Event amount with 2 decimal places precision
    ///
    /// Required for expense, entry, and apply events. None for
    /// reverse, settle, unsettle, and member events.
    pub amount: Option<Decimal>,

    /// Direction for apply events
    ///
    /// None for every other event type.
    pub direction: Option<Direction>,

    /// Entry kind for entry events
    ///
    /// Identifies whether the declared entry is a debt or a credit.
    /// None for every other event type.
    pub kind: Option<EntryKind>,
}

/// Stored ledger entry
///
/// An obligation owed by or to a member. Settlement flips `settled`
/// and records which transaction carried the balance change, so the
/// settlement can later be undone exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// The member this entry belongs to
    pub member: MemberId,

    /// Whether the member owes (debt) or is owed (credit)
    pub kind: EntryKind,

    /// The entry amount with 2 decimal places precision
    pub amount: Decimal,

    /// Whether this entry has been settled
    ///
    /// Set to true when a settlement succeeds, false when it is undone.
    /// Used to prevent duplicate settlements and validate unsettle
    /// operations.
    pub settled: bool,

    /// The transaction that settled this entry
    ///
    /// Some while the entry is settled, None otherwise. A settled
    /// entry whose linked transaction cannot be found is a reversal
    /// mismatch and must be surfaced, never ignored.
    pub linked_tx: Option<TxId>,
}

impl LedgerEntry {
    /// Create a new unsettled entry
    pub fn new(member: MemberId, kind: EntryKind, amount: Decimal) -> Self {
        LedgerEntry {
            member,
            kind,
            amount,
            settled: false,
            linked_tx: None,
        }
    }
}

/// Stored transaction record
///
/// Every balance mutation writes one of these so it can be reversed
/// with the exact negated delta. Deleted when reversed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// The member whose balance this transaction changed
    pub member: MemberId,

    /// The transaction amount with 2 decimal places precision
    pub amount: Decimal,

    /// Whether the amount was added to or subtracted from the balance
    pub direction: Direction,
}

/// A group expense paid by one member on behalf of the group
///
/// The member set current at the time the expense was recorded is
/// captured so snapshot splitting can divide the expense across the
/// members who were actually present.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupExpense {
    /// The member who paid
    pub payer: MemberId,

    /// The full expense amount
    pub amount: Decimal,

    /// Members of the group when the expense was recorded
    pub snapshot: BTreeSet<MemberId>,
}
