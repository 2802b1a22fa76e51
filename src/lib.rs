//! Group Ledger Library
//!
//! # Overview
//!
//! This library provides a streaming CSV-based processor for shared group
//! finances, implementing both a sync and an async strategy. It tracks
//! per-member account balances, records group expenses, and computes the
//! minimal set of transfers that settles the group.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, EventRecord, LedgerEntry, Transfer, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Ledger event processing orchestration
//!   - [`core::account_store`] - Balance state and transaction records
//!   - [`core::entry_store`] - Ledger entries (debts and credits)
//!   - [`core::group`] - Group membership and expense tracking
//!   - [`core::settlement`] - Net position and transfer plan computation
//! - [`io`] - I/O handling with sync and async CSV readers
//! - [`strategy`] - Pluggable processing pipelines (sync, async batch)
//!
//! # Event Types
//!
//! The engine supports seven event types:
//!
//! - **Member**: Add a member to the group
//! - **Expense**: Record a group expense paid by a member
//! - **Entry**: Record a ledger entry (debt or credit) for a member
//! - **Apply**: Apply a balance transaction (increase or decrease)
//! - **Reverse**: Reverse a previously applied transaction exactly
//! - **Settle**: Settle a ledger entry against the member's balance
//! - **Unsettle**: Undo a settlement via its linked transaction
//!
//! # Settlement
//!
//! Settlement computes each member's net position (total paid minus total
//! share) and produces a transfer plan via a greedy two-pointer sweep over
//! debtors and creditors sorted by magnitude. Residual amounts under one
//! cent are dropped.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{Group, InMemoryAccountStore, InMemoryEntryStore, LedgerEngine};
pub use io::{write_accounts_csv, write_transfers_csv};
pub use types::{
    Account, Direction, EntryId, EntryKind, EventRecord, EventType, LedgerEntry, LedgerError,
    MemberId, SplitPolicy, TransactionRecord, Transfer, TxId,
};
