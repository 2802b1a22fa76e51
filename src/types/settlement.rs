//! Settlement-related types for the Group Ledger
//!
//! This module defines the input and output types of the settlement
//! engine: expenses, net balances, and the suggested transfers that
//! bring every member back to zero.

use super::ledger::MemberId;
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single expense fed into the settlement engine
///
/// Paid in full by one member on behalf of the group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expense {
    /// The member who paid
    pub payer: MemberId,

    /// The full expense amount
    pub amount: Decimal,
}

/// A member's net position after all expenses are divided
///
/// Positive means the group owes the member (they paid more than
/// their share); negative means the member owes the group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetBalance {
    /// The member this position belongs to
    pub member: MemberId,

    /// totalPaid minus totalShare
    pub net: Decimal,
}

/// A suggested settlement transfer between two members
///
/// Emitted by the settlement engine. `from` pays `to`; the engine
/// never emits a transfer from a member to themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// The member who pays
    pub from: MemberId,

    /// The member who receives
    pub to: MemberId,

    /// The transfer amount, always positive
    pub amount: Decimal,
}

/// How group expenses are divided across members
///
/// Re-splitting across the current member set retroactively changes
/// shares when members join after an expense was recorded; the
/// snapshot policy pins each expense to the members present when it
/// was recorded. Both behaviors are kept behind this switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitPolicy {
    /// Divide every expense across the group's current member set
    ///
    /// Members who join later share in expenses recorded before they
    /// joined.
    CurrentMembers,

    /// Divide each expense across the member set captured when the
    /// expense was recorded
    ///
    /// Later joiners owe nothing for earlier expenses.
    SnapshotAtEntry,
}
