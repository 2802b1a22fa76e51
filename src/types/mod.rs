//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account-related types
//! - `ledger`: Event, entry, and transaction types and identifiers
//! - `settlement`: Settlement engine input and output types
//! - `error`: Error types for the group ledger

pub mod account;
pub mod error;
pub mod ledger;
pub mod settlement;

pub use account::Account;
pub use error::LedgerError;
pub use ledger::{
    Direction, EntryId, EntryKind, EventRecord, EventType, GroupExpense, LedgerEntry, MemberId,
    TransactionRecord, TxId,
};
pub use settlement::{Expense, NetBalance, SplitPolicy, Transfer};
