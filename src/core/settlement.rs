//! Settlement engine
//!
//! This module computes who owes whom after a group's expenses are divided
//! across its members. It is pure: the same expenses and member set always
//! produce the same transfers, and nothing here touches account or entry
//! state. Callers apply the suggested transfers through the ledger engine
//! if they choose to.
//!
//! # Algorithm
//!
//! 1. Net position per member = totalPaid - totalShare, with the two sums
//!    accumulated independently so per-expense rounding never compounds.
//! 2. Members are partitioned into debtors (net below -epsilon) and
//!    creditors (net above +epsilon); positions within the tolerance band
//!    owe and receive nothing.
//! 3. Both sides are sorted descending by magnitude and swept with two
//!    pointers: the largest debtor pays the largest creditor
//!    min(remaining, remaining), whichever side reaches the tolerance
//!    advances, until one side is exhausted.
//!
//! The sweep emits at most members - 1 transfers, never a self-transfer,
//! and drops residual dust below the tolerance.
//!
//! # Rounding
//!
//! Shares are rounded to 2 decimal places with banker's rounding and the
//! payer absorbs the remainder, so the shares of one expense always sum
//! exactly to its amount.

use crate::types::{Expense, GroupExpense, LedgerError, MemberId, NetBalance, Transfer};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

/// Tolerance below which a net position is treated as settled
///
/// One cent: positions within ±0.01 of zero generate no transfers, and
/// transfer remainders below it are dropped.
pub const SETTLEMENT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Divide one expense across its participants and accumulate the totals
///
/// Adds the full amount to the payer's paid total and each participant's
/// rounded share to their share total. The payer's share is the amount
/// minus everyone else's shares, so the shares sum exactly to the amount.
fn accumulate(
    paid: &mut HashMap<MemberId, Decimal>,
    share: &mut HashMap<MemberId, Decimal>,
    payer: MemberId,
    amount: Decimal,
    participants: &BTreeSet<MemberId>,
) -> Result<(), LedgerError> {
    if !participants.contains(&payer) {
        return Err(LedgerError::invalid_group_state(&format!(
            "payer {} is not a member of the group",
            payer
        )));
    }

    *paid.entry(payer).or_insert(Decimal::ZERO) += amount;

    let count = Decimal::from(participants.len());
    let per_member = (amount / count).round_dp(2);

    let mut others = Decimal::ZERO;
    for &member in participants {
        if member == payer {
            continue;
        }
        *share.entry(member).or_insert(Decimal::ZERO) += per_member;
        others += per_member;
    }

    // Payer absorbs the rounding remainder
    *share.entry(payer).or_insert(Decimal::ZERO) += amount - others;

    Ok(())
}

/// Collect the accumulated totals into net positions, one per member
///
/// Net = totalPaid - totalShare. Output is sorted by member ID for
/// deterministic downstream processing.
fn collect(
    paid: &HashMap<MemberId, Decimal>,
    share: &HashMap<MemberId, Decimal>,
    members: &BTreeSet<MemberId>,
) -> Vec<NetBalance> {
    members
        .iter()
        .map(|&member| {
            let total_paid = paid.get(&member).copied().unwrap_or(Decimal::ZERO);
            let total_share = share.get(&member).copied().unwrap_or(Decimal::ZERO);
            NetBalance {
                member,
                net: total_paid - total_share,
            }
        })
        .collect()
}

/// Compute net positions with every expense divided across `members`
///
/// This is the current-members split: all expenses are shared by whoever
/// is a member now, including members who joined after an expense was
/// recorded.
///
/// # Errors
///
/// Returns `InvalidGroupState` if `members` is empty or any payer is not
/// in `members`.
pub fn net_balances(
    expenses: &[Expense],
    members: &BTreeSet<MemberId>,
) -> Result<Vec<NetBalance>, LedgerError> {
    if members.is_empty() {
        return Err(LedgerError::invalid_group_state("group has no members"));
    }

    let mut paid = HashMap::new();
    let mut share = HashMap::new();

    for expense in expenses {
        accumulate(&mut paid, &mut share, expense.payer, expense.amount, members)?;
    }

    Ok(collect(&paid, &share, members))
}

/// Compute net positions with each expense divided across its snapshot
///
/// This is the snapshot-at-entry split: each expense is shared only by
/// the members recorded when it was added, so later joiners owe nothing
/// for earlier expenses.
///
/// # Errors
///
/// Returns `InvalidGroupState` if `members` is empty or any payer is not
/// in its expense's snapshot.
pub fn net_balances_snapshot(
    expenses: &[GroupExpense],
    members: &BTreeSet<MemberId>,
) -> Result<Vec<NetBalance>, LedgerError> {
    if members.is_empty() {
        return Err(LedgerError::invalid_group_state("group has no members"));
    }

    let mut paid = HashMap::new();
    let mut share = HashMap::new();

    for expense in expenses {
        accumulate(
            &mut paid,
            &mut share,
            expense.payer,
            expense.amount,
            &expense.snapshot,
        )?;
    }

    Ok(collect(&paid, &share, members))
}

/// Turn net positions into a minimal list of settlement transfers
///
/// Greedy sweep: largest debtor pays largest creditor, ties broken by
/// member ID ascending so output is deterministic. Emits at most
/// `positions - 1` transfers and never a self-transfer. Residual
/// positions within the tolerance are dropped.
pub fn transfers(nets: &[NetBalance]) -> Vec<Transfer> {
    // (member, remaining magnitude) for each side of the ledger
    let mut debtors: Vec<(MemberId, Decimal)> = nets
        .iter()
        .filter(|n| n.net < -SETTLEMENT_EPSILON)
        .map(|n| (n.member, -n.net))
        .collect();
    let mut creditors: Vec<(MemberId, Decimal)> = nets
        .iter()
        .filter(|n| n.net > SETTLEMENT_EPSILON)
        .map(|n| (n.member, n.net))
        .collect();

    debtors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut result = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].1.min(creditors[j].1);

        result.push(Transfer {
            from: debtors[i].0,
            to: creditors[j].0,
            amount,
        });

        debtors[i].1 -= amount;
        creditors[j].1 -= amount;

        // Advance whichever side is (within tolerance of) exhausted
        if debtors[i].1 <= SETTLEMENT_EPSILON {
            i += 1;
        }
        if creditors[j].1 <= SETTLEMENT_EPSILON {
            j += 1;
        }
    }

    result
}

/// Compute settlement transfers for a set of expenses in one call
///
/// Convenience wrapper: nets the expenses across `members` and sweeps
/// the result.
///
/// # Errors
///
/// Returns `InvalidGroupState` if `members` is empty or any payer is not
/// in `members`.
pub fn settle_expenses(
    expenses: &[Expense],
    members: &BTreeSet<MemberId>,
) -> Result<Vec<Transfer>, LedgerError> {
    Ok(transfers(&net_balances(expenses, members)?))
}
