//! Group model
//!
//! This module provides the `Group` struct which tracks the member set and
//! the expenses recorded against it. Each expense captures a snapshot of
//! the member set at the time it was recorded, so settlement can divide it
//! either across the current members or across the snapshot, depending on
//! the configured split policy.

use crate::core::settlement;
use crate::types::{
    Expense, GroupExpense, LedgerError, MemberId, NetBalance, SplitPolicy, Transfer,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// A group of members sharing expenses
///
/// Membership only grows; removing members is not supported. Expenses
/// are kept in the order they were recorded.
#[derive(Debug, Clone, Default)]
pub struct Group {
    /// Current member set
    members: BTreeSet<MemberId>,

    /// Expenses recorded against the group, in order
    expenses: Vec<GroupExpense>,
}

impl Group {
    /// Create a new group with no members and no expenses
    pub fn new() -> Self {
        Group {
            members: BTreeSet::new(),
            expenses: Vec::new(),
        }
    }

    /// Add a member to the group
    ///
    /// Returns `true` if the member was newly added, `false` if they
    /// were already a member. Adding a member never changes snapshots
    /// of previously recorded expenses.
    pub fn add_member(&mut self, member: MemberId) -> bool {
        self.members.insert(member)
    }

    /// Check whether a member belongs to the group
    pub fn contains(&self, member: MemberId) -> bool {
        self.members.contains(&member)
    }

    /// The current member set
    pub fn members(&self) -> &BTreeSet<MemberId> {
        &self.members
    }

    /// The recorded expenses, in order
    pub fn expenses(&self) -> &[GroupExpense] {
        &self.expenses
    }

    /// Record an expense paid by a member
    ///
    /// Captures the current member set as the expense's snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroupState` if the payer is not a member.
    pub fn add_expense(&mut self, payer: MemberId, amount: Decimal) -> Result<(), LedgerError> {
        if !self.members.contains(&payer) {
            return Err(LedgerError::invalid_group_state(&format!(
                "payer {} is not a member of the group",
                payer
            )));
        }

        self.expenses.push(GroupExpense {
            payer,
            amount,
            snapshot: self.members.clone(),
        });
        Ok(())
    }

    /// Compute net positions for all members under the given policy
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroupState` if the group has no members.
    pub fn net_balances(&self, policy: SplitPolicy) -> Result<Vec<NetBalance>, LedgerError> {
        match policy {
            SplitPolicy::CurrentMembers => {
                let expenses: Vec<Expense> = self
                    .expenses
                    .iter()
                    .map(|e| Expense {
                        payer: e.payer,
                        amount: e.amount,
                    })
                    .collect();
                settlement::net_balances(&expenses, &self.members)
            }
            SplitPolicy::SnapshotAtEntry => {
                settlement::net_balances_snapshot(&self.expenses, &self.members)
            }
        }
    }

    /// Compute settlement transfers for the group under the given policy
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroupState` if the group has no members.
    pub fn settle(&self, policy: SplitPolicy) -> Result<Vec<Transfer>, LedgerError> {
        Ok(settlement::transfers(&self.net_balances(policy)?))
    }
}
