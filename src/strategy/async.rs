//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of the
//! ProcessingStrategy trait. It processes ledger events in batches using
//! thread-based parallelism with member-based partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncEventReader (batch CSV reading)
//!     ├── BatchProcessor (member partitioning + task spawning)
//!     └── AsyncLedgerEngine (thread-safe processing)
//!         ├── AsyncAccountStore (thread-safe balances + transactions)
//!         └── AsyncEntryStore (thread-safe ledger entries)
//! ```
//!
//! # Thread-Based Parallelism
//!
//! - Processes batches sequentially to maintain per-member ordering across the file
//! - Within each batch, partitions by member ID for parallel processing
//! - Spawns worker tasks via tokio multi-threaded runtime
//! - Uses Arc + DashMap for thread-safe shared state

use crate::cli::EmitMode;
use crate::core::r#async::{AsyncAccountStore, AsyncEntryStore, AsyncLedgerEngine, BatchProcessor};
use crate::io::async_reader::AsyncEventReader;
use crate::io::csv_format::{write_accounts_csv, write_transfers_csv};
use crate::strategy::ProcessingStrategy;
use crate::types::SplitPolicy;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
///
/// Controls how events are batched and the number of worker threads
/// for parallel processing within each batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of events per batch
    pub batch_size: usize,
    /// Maximum number of batches processing concurrently
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values are invalid and replaced by defaults with a stderr warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            eprintln!(
                "Warning: Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            eprintln!(
                "Warning: Invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches, default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Implements the ProcessingStrategy trait using multi-threaded, asynchronous
/// batch processing. Events are read in batches and processed batch-by-batch
/// to maintain ordering guarantees. Within each batch, events are partitioned
/// by member ID and processed in parallel across tokio worker threads.
///
/// # Thread Safety
///
/// AsyncProcessingStrategy is Send + Sync and uses thread-safe components
/// internally (Arc-wrapped AsyncLedgerEngine with DashMap-based stores).
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    split_policy: SplitPolicy,
    emit: EmitMode,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent_batches
    /// * `split_policy` - How group expenses are split among members
    /// * `emit` - Whether to write final balances or settlement transfers
    pub fn new(config: BatchConfig, split_policy: SplitPolicy, emit: EmitMode) -> Self {
        Self {
            config,
            split_policy,
            emit,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process events from input file and write results to output
    ///
    /// This method implements the complete asynchronous batch pipeline:
    /// 1. Creates thread-safe engine components (AsyncLedgerEngine, stores)
    /// 2. Creates a BatchProcessor for member-based partitioning
    /// 3. Creates a tokio multi-threaded runtime
    /// 4. Reads events in batches from CSV using AsyncEventReader
    /// 5. Processes each batch sequentially (waits for completion before next batch)
    /// 6. Within each batch, processes different members in parallel
    /// 7. Writes final balances or the settlement transfer plan to output
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors) are returned
    /// immediately. Individual event errors are logged to stderr and
    /// processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        // Multi-threaded runtime with configured number of worker threads
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            // Thread-safe engine components
            let account_store = Arc::new(AsyncAccountStore::new());
            let entry_store = Arc::new(AsyncEntryStore::new());
            let engine = Arc::new(AsyncLedgerEngine::new(
                Arc::clone(&account_store),
                Arc::clone(&entry_store),
                self.split_policy,
            ));

            let processor = BatchProcessor::new(Arc::clone(&engine));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);

            let mut reader = AsyncEventReader::new(compat_file);

            // Process batches sequentially to maintain per-member ordering
            // across the entire file. Each batch is still processed in
            // parallel across different members.
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;

                if batch.is_empty() {
                    break;
                }

                // Wait for batch completion before reading the next batch so
                // a member's events spanning batches stay in order
                let _results = processor.process_batch(batch).await;
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
        })
    }
}
