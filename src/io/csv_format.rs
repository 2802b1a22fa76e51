//! CSV format handling for event records and output
//!
//! This module centralizes all CSV format concerns, providing:
//! - EventCsvRecord structure for deserialization
//! - Conversion from CSV records to domain types
//! - Account balance and settlement transfer output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{
    Account, Direction, EntryId, EntryKind, EventRecord, EventType, MemberId, Transfer, TxId,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns:
/// type, member, entry, tx, amount, direction, kind
///
/// Everything after `member` is optional because each event type uses a
/// different subset of the columns: a reversal names a transaction but no
/// amount, a settlement names an entry and nothing else.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EventCsvRecord {
    #[serde(rename = "type")]
    pub event_type: String,
    pub member: MemberId,
    #[serde(default)]
    pub entry: Option<EntryId>,
    #[serde(default)]
    pub tx: Option<TxId>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Convert an EventCsvRecord to an EventRecord
///
/// This function:
/// - Parses the event type string into an EventType enum
/// - Parses the amount string into a Decimal (if present) and rejects
///   negative amounts
/// - Parses direction and kind strings into their enums
/// - Validates that the fields each event type requires are present
///
/// # Returns
///
/// Result containing either:
/// - Ok(EventRecord) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_event_record(csv_record: EventCsvRecord) -> Result<EventRecord, String> {
    let event_type = match csv_record.event_type.to_lowercase().as_str() {
        "member" => EventType::Member,
        "expense" => EventType::Expense,
        "entry" => EventType::Entry,
        "apply" => EventType::Apply,
        "reverse" => EventType::Reverse,
        "settle" => EventType::Settle,
        "unsettle" => EventType::Unsettle,
        _ => {
            return Err(format!(
                "Invalid event type: '{}' for member {}",
                csv_record.event_type, csv_record.member
            ))
        }
    };

    // Parse amount if present
    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            match Decimal::from_str(amount_str.trim()) {
                Ok(decimal) if decimal.is_sign_negative() => {
                    return Err(format!(
                        "Negative amount '{}' for member {}",
                        amount_str, csv_record.member
                    ))
                }
                Ok(decimal) => Some(decimal),
                Err(_) => {
                    return Err(format!(
                        "Invalid amount '{}' for member {}",
                        amount_str, csv_record.member
                    ))
                }
            }
        }
        _ => None,
    };

    // Parse direction if present
    let direction = match csv_record.direction {
        Some(direction_str) if !direction_str.trim().is_empty() => {
            match direction_str.trim().to_lowercase().as_str() {
                "increase" => Some(Direction::Increase),
                "decrease" => Some(Direction::Decrease),
                _ => {
                    return Err(format!(
                        "Invalid direction: '{}' for member {}",
                        direction_str, csv_record.member
                    ))
                }
            }
        }
        _ => None,
    };

    // Parse entry kind if present
    let kind = match csv_record.kind {
        Some(kind_str) if !kind_str.trim().is_empty() => {
            match kind_str.trim().to_lowercase().as_str() {
                "debt" => Some(EntryKind::Debt),
                "credit" => Some(EntryKind::Credit),
                _ => {
                    return Err(format!(
                        "Invalid entry kind: '{}' for member {}",
                        kind_str, csv_record.member
                    ))
                }
            }
        }
        _ => None,
    };

    // Validate field presence based on event type
    let required: &[&str] = match event_type {
        EventType::Member => &[],
        EventType::Expense => &["amount"],
        EventType::Entry => &["entry", "kind", "amount"],
        EventType::Apply => &["tx", "amount", "direction"],
        EventType::Reverse => &["tx"],
        EventType::Settle | EventType::Unsettle => &["entry"],
    };
    for field in required {
        let present = match *field {
            "entry" => csv_record.entry.is_some(),
            "tx" => csv_record.tx.is_some(),
            "amount" => amount.is_some(),
            "direction" => direction.is_some(),
            "kind" => kind.is_some(),
            _ => true,
        };
        if !present {
            return Err(format!(
                "{:?} event for member {} requires field '{}'",
                event_type, csv_record.member, field
            ));
        }
    }

    Ok(EventRecord {
        event_type,
        member: csv_record.member,
        entry: csv_record.entry,
        tx: csv_record.tx,
        amount,
        direction,
        kind,
    })
}

/// Write account balances to CSV format
///
/// Writes accounts in CSV format with columns: member, balance
/// Accounts are sorted by member ID for deterministic output; balances
/// are rendered with two decimal places.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["member", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    // Sort accounts by member ID for deterministic output
    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.member);

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.member.to_string(),
                format!("{:.2}", account.balance),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write settlement transfers to CSV format
///
/// Writes transfers in CSV format with columns: from, to, amount.
/// Transfers are written in the order the settlement sweep produced
/// them, which is already deterministic.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_transfers_csv(transfers: &[Transfer], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["from", "to", "amount"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for transfer in transfers {
        writer
            .write_record(&[
                transfer.from.to_string(),
                transfer.to.to_string(),
                format!("{:.2}", transfer.amount),
            ])
            .map_err(|e| format!("Failed to write transfer record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
