//! Processing strategy module for ledger event processing
//!
//! This module defines the Strategy pattern for complete event processing
//! pipelines, encompassing CSV parsing, ledger engine processing, and output
//! emission. This allows different processing implementations (synchronous,
//! asynchronous batch) to be selected at runtime.

use crate::cli::{EmitMode, StrategyType};
use crate::types::SplitPolicy;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete event processing pipelines
///
/// This trait defines the interface for different event processing
/// implementations. Each strategy must be able to read ledger events from a
/// CSV file, process them through the appropriate engine, and write the
/// requested output (balances or settlement transfers) to a writer.
pub trait ProcessingStrategy: Send + Sync {
    /// Process events from input file and write results to output
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file containing ledger events
    /// * `output` - Mutable reference to a writer for the final output
    ///
    /// # Returns
    ///
    /// * `Ok(())` if all processing completed successfully (or with recoverable errors)
    /// * `Err(String)` if a fatal error occurred (file not found, I/O error, etc.)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (file not found, permission denied)
    /// - A fatal I/O error occurs during reading or writing
    /// - Output cannot be written
    ///
    /// Individual event processing errors are logged to stderr and do not
    /// cause this method to return an error. Processing continues with the
    /// next event.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// Factory function selecting and instantiating the appropriate processing
/// strategy implementation at runtime.
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `split_policy` - How group expenses are split among members
/// * `emit` - What the strategy writes after processing (balances or transfers)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    split_policy: SplitPolicy,
    emit: EmitMode,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(split_policy, emit)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, split_policy, emit))
        }
    }
}
