//! Error types for the Group Ledger
//!
//! This module defines all error types that can occur during event processing.
//! Errors are designed to be descriptive and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, invalid data types, etc.
//! - **Ledger Errors**: Insufficient funds, missing entries, reversal mismatches, etc.
//! - **Store Errors**: Conflicting or unavailable store access
//! - **Arithmetic Errors**: Overflow, underflow in balance calculations

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the group ledger
///
/// This enum represents all possible errors that can occur during
/// event processing. Each variant includes relevant context
/// to help diagnose and resolve the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    ///
    /// This is typically a fatal error (file permissions, disk full, etc.).
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Invalid event type encountered
    ///
    /// This is a recoverable error - the invalid event is skipped
    /// and processing continues.
    #[error("Invalid event type '{event_type}'{}", member.map(|m| format!(" for member {}", m)).unwrap_or_default())]
    InvalidEventType {
        /// The invalid event type string
        event_type: String,
        /// Member ID (if available)
        member: Option<u16>,
    },

    /// A field required by the event type is missing
    ///
    /// Expense, entry, and apply events require an amount; settle and
    /// unsettle require an entry ID; apply and reverse require a
    /// transaction ID. This is a recoverable error.
    #[error("{event_type} event for member {member} requires field '{field}'")]
    MissingField {
        /// Event type that requires the field
        event_type: String,
        /// Member ID
        member: u16,
        /// Name of the missing field
        field: String,
    },

    /// Invalid amount value (negative or malformed)
    ///
    /// This is a recoverable error - the event is skipped.
    #[error("Invalid amount '{amount}' for member {member}")]
    InvalidAmount {
        /// The invalid amount string
        amount: String,
        /// Member ID
        member: u16,
    },

    /// Insufficient funds for a debt settlement
    ///
    /// Settling a debt larger than the member's balance is rejected
    /// and the account, entry, and transaction state remain unchanged.
    #[error("Insufficient funds for member {member}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Member ID
        member: u16,
        /// Current balance
        balance: Decimal,
        /// Requested settlement amount
        requested: Decimal,
    },

    /// The group cannot be settled in its current state
    ///
    /// Raised when the member set is empty or an expense payer is not
    /// a member of the group.
    #[error("Invalid group state: {message}")]
    InvalidGroupState {
        /// Description of the invalid state
        message: String,
    },

    /// The backing store could not be reached
    ///
    /// Surfaced to the caller as retryable; the operation may be
    /// attempted again once the store recovers.
    #[error("Store unavailable during {operation}")]
    StoreUnavailable {
        /// Operation that failed
        operation: String,
    },

    /// A conditional balance write lost a race
    ///
    /// The balance changed between read and write. Retried internally
    /// with a fresh read; surfaced only when retries are exhausted.
    #[error("Store conflict on member {member}: expected balance {expected}, found {found}")]
    StoreConflict {
        /// Member ID
        member: u16,
        /// Balance the writer expected
        expected: Decimal,
        /// Balance actually in the store
        found: Decimal,
    },

    /// A settled entry's linked transaction is missing
    ///
    /// The ledger and transaction store disagree. This must surface to
    /// the caller; it is never silently ignored.
    #[error("Reversal mismatch for entry {entry}: {}", tx.map(|t| format!("linked transaction {} not found", t)).unwrap_or_else(|| "no linked transaction recorded".to_string()))]
    ReversalMismatch {
        /// Entry ID whose settlement could not be reversed
        entry: u32,
        /// The missing transaction ID (if the entry recorded one)
        tx: Option<u32>,
    },

    /// Arithmetic overflow would occur
    ///
    /// This is a recoverable error - the event is rejected
    /// to maintain account integrity.
    #[error("Arithmetic overflow in {operation} for member {member}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Member ID
        member: u16,
    },

    /// Arithmetic underflow would occur
    ///
    /// This is a recoverable error - the event is rejected
    /// to maintain account integrity.
    #[error("Arithmetic underflow in {operation} for member {member}")]
    ArithmeticUnderflow {
        /// Operation that would underflow
        operation: String,
        /// Member ID
        member: u16,
    },

    /// Transaction not found for a reversal
    ///
    /// This is a recoverable error - the reverse is rejected and
    /// processing continues.
    #[error("Transaction {tx} not found for {operation}")]
    TransactionNotFound {
        /// Transaction ID that was not found
        tx: u32,
        /// Operation that failed
        operation: String,
    },

    /// Ledger entry not found
    ///
    /// This is a recoverable error - the settle/unsettle is rejected.
    #[error("Entry {entry} not found for {operation}")]
    EntryNotFound {
        /// Entry ID that was not found
        entry: u32,
        /// Operation that failed
        operation: String,
    },

    /// Entry is already settled
    ///
    /// This is a recoverable error - the duplicate settlement is rejected.
    #[error("Entry {entry} for member {member} is already settled")]
    EntryAlreadySettled {
        /// Entry ID
        entry: u32,
        /// Member ID
        member: u16,
    },

    /// Entry is not settled
    ///
    /// This is a recoverable error - the unsettle is rejected.
    #[error("Entry {entry} for member {member} is not settled")]
    EntryNotSettled {
        /// Entry ID
        entry: u32,
        /// Member ID
        member: u16,
    },

    /// Member mismatch in an entry or reversal operation
    ///
    /// The member ID on the event doesn't match the member ID of the
    /// stored entry or transaction.
    /// This is a recoverable error - the operation is rejected.
    #[error("Member mismatch for {operation}: expected member {expected_member}, got member {actual_member}")]
    MemberMismatch {
        /// Expected member ID (from stored state)
        expected_member: u16,
        /// Actual member ID (from the event)
        actual_member: u16,
        /// Operation that failed
        operation: String,
    },

    /// Duplicate transaction ID encountered
    ///
    /// Transaction IDs must be unique. This is a recoverable error -
    /// the duplicate is rejected.
    #[error("Duplicate transaction ID {tx} for member {member}")]
    DuplicateTransaction {
        /// Transaction ID that is duplicated
        tx: u32,
        /// Member ID
        member: u16,
    },

    /// Duplicate entry ID encountered
    ///
    /// Entry IDs must be unique. This is a recoverable error -
    /// the duplicate is rejected.
    #[error("Duplicate entry ID {entry} for member {member}")]
    DuplicateEntry {
        /// Entry ID that is duplicated
        entry: u32,
        /// Member ID
        member: u16,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InsufficientFunds error
    pub fn insufficient_funds(member: u16, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            member,
            balance,
            requested,
        }
    }

    /// Create an InvalidGroupState error
    pub fn invalid_group_state(message: &str) -> Self {
        LedgerError::InvalidGroupState {
            message: message.to_string(),
        }
    }

    /// Create a StoreUnavailable error
    pub fn store_unavailable(operation: &str) -> Self {
        LedgerError::StoreUnavailable {
            operation: operation.to_string(),
        }
    }

    /// Create a StoreConflict error
    pub fn store_conflict(member: u16, expected: Decimal, found: Decimal) -> Self {
        LedgerError::StoreConflict {
            member,
            expected,
            found,
        }
    }

    /// Create a ReversalMismatch error
    pub fn reversal_mismatch(entry: u32, tx: Option<u32>) -> Self {
        LedgerError::ReversalMismatch { entry, tx }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(tx: u32, operation: &str) -> Self {
        LedgerError::TransactionNotFound {
            tx,
            operation: operation.to_string(),
        }
    }

    /// Create an EntryNotFound error
    pub fn entry_not_found(entry: u32, operation: &str) -> Self {
        LedgerError::EntryNotFound {
            entry,
            operation: operation.to_string(),
        }
    }

    /// Create an EntryAlreadySettled error
    pub fn entry_already_settled(entry: u32, member: u16) -> Self {
        LedgerError::EntryAlreadySettled { entry, member }
    }

    /// Create an EntryNotSettled error
    pub fn entry_not_settled(entry: u32, member: u16) -> Self {
        LedgerError::EntryNotSettled { entry, member }
    }

    /// Create a MemberMismatch error
    pub fn member_mismatch(expected_member: u16, actual_member: u16, operation: &str) -> Self {
        LedgerError::MemberMismatch {
            expected_member,
            actual_member,
            operation: operation.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, member: u16) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            member,
        }
    }

    /// Create an ArithmeticUnderflow error
    pub fn arithmetic_underflow(operation: &str, member: u16) -> Self {
        LedgerError::ArithmeticUnderflow {
            operation: operation.to_string(),
            member,
        }
    }

    /// Create a MissingField error
    pub fn missing_field(event_type: &str, member: u16, field: &str) -> Self {
        LedgerError::MissingField {
            event_type: event_type.to_string(),
            member,
            field: field.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, member: u16) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
            member,
        }
    }

    /// Create an InvalidEventType error
    pub fn invalid_event_type(event_type: &str, member: Option<u16>) -> Self {
        LedgerError::InvalidEventType {
            event_type: event_type.to_string(),
            member,
        }
    }

    /// Create a DuplicateTransaction error
    pub fn duplicate_transaction(tx: u32, member: u16) -> Self {
        LedgerError::DuplicateTransaction { tx, member }
    }

    /// Create a DuplicateEntry error
    pub fn duplicate_entry(entry: u32, member: u16) -> Self {
        LedgerError::DuplicateEntry { entry, member }
    }
}
