//! Account-related types for the Group Ledger
//!
//! This module defines the Account structure for managing member
//! account state.

use super::ledger::MemberId;
use rust_decimal::Decimal;

/// Member account state
///
/// Represents the current state of a member's account: a single
/// running balance mutated by applied transactions and settlements.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The member ID (u16: 0-65,535)
    pub member: MemberId,

    /// Current balance
    ///
    /// Increased by credit settlements and increase transactions,
    /// decreased by debt settlements and decrease transactions.
    /// Debt settlements may not take the balance below zero.
    pub balance: Decimal,
}

impl Account {
    /// Create a new account with a zero balance
    ///
    /// # Arguments
    ///
    /// * `member` - The member ID for this account
    ///
    /// # Returns
    ///
    /// A new Account with balance = 0.00
    pub fn new(member: MemberId) -> Self {
        Account {
            member,
            balance: Decimal::ZERO,
        }
    }
}
