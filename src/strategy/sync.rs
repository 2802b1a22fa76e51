//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates event processing by coordinating
//! between the SyncEventReader (for CSV input) and LedgerEngine (for business
//! logic).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncEventReader` (iterator interface)
//! - Event processing to `LedgerEngine` (business logic)
//! - CSV output to the `csv_format` module (format handling)
//!
//! # Memory Efficiency
//!
//! This strategy maintains constant memory for the input stream:
//! - Processes CSV records one at a time (streaming via iterator)
//! - Does not load entire file into memory
//! - Memory usage is O(accounts + entries + transactions), not O(all events)

use crate::cli::EmitMode;
use crate::core::LedgerEngine;
use crate::io::csv_format::{write_accounts_csv, write_transfers_csv};
use crate::io::sync_reader::SyncEventReader;
use crate::strategy::ProcessingStrategy;
use crate::types::SplitPolicy;
use std::io::Write;
use std::path::Path;

/// Synchronous processing strategy
///
/// Implements the ProcessingStrategy trait using single-threaded, synchronous
/// processing. Orchestrates the flow between CSV reading, event processing,
/// and output generation.
///
/// # Examples
///
/// ```no_run
/// use group_ledger::cli::EmitMode;
/// use group_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use group_ledger::types::SplitPolicy;
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(SplitPolicy::CurrentMembers, EmitMode::Balances);
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("events.csv"), &mut output)
///     .expect("Processing failed");
/// ```
///
/// # Thread Safety
///
/// SyncProcessingStrategy is Send + Sync, allowing it to be shared across
/// threads safely, even though it performs single-threaded processing.
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy {
    split_policy: SplitPolicy,
    emit: EmitMode,
}

impl SyncProcessingStrategy {
    /// Create a new SyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `split_policy` - How group expenses are split among members
    /// * `emit` - Whether to write final balances or settlement transfers
    pub fn new(split_policy: SplitPolicy, emit: EmitMode) -> Self {
        Self { split_policy, emit }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Process events from input file and write results to output
    ///
    /// This method orchestrates the complete synchronous pipeline:
    /// 1. Creates a SyncEventReader to stream event records from the CSV file
    /// 2. Creates a LedgerEngine to process events
    /// 3. Iterates through records, processing each through the engine
    /// 4. Writes final balances or the settlement transfer plan to output
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors) are returned immediately.
    /// Individual event errors are logged to stderr and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let mut engine = LedgerEngine::new(self.split_policy);

        // Stream records one at a time through the engine
        let reader = SyncEventReader::new(input_path)?;

        for result in reader {
            match result {
                Ok(event_record) => {
                    if let Err(e) = engine.process(event_record) {
                        eprintln!("Event processing error: {}", e);
                    }
                }
                Err(e) => {
                    eprintln!("CSV parsing error: {}", e);
                }
            }
        }

        match self.emit {
            EmitMode::Balances => {
                let accounts = engine.accounts();
                write_accounts_csv(&accounts, output)?;
            }
            EmitMode::Transfers => {
                let transfers = engine
                    .settlement()
                    .map_err(|e| format!("Settlement computation failed: {}", e))?;
                write_transfers_csv(&transfers, output)?;
            }
        }

        Ok(())
    }
}
