//! Command-line argument parsing
//!
//! Defines the CLI surface for the group ledger tool: input file selection,
//! processing strategy, batch tuning knobs, expense split policy, and the
//! output mode (final balances or settlement transfers).

use crate::strategy::BatchConfig;
use crate::types::SplitPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Processing strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    /// Single-threaded streaming processing
    Sync,
    /// Multi-threaded batch processing with member partitioning
    Async,
}

/// Output selection for the processing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmitMode {
    /// Emit final member balances as CSV
    Balances,
    /// Emit the minimal settlement transfer plan as CSV
    Transfers,
}

/// Group ledger event processor
///
/// Reads ledger events from a CSV file, applies them through the ledger
/// engine, and writes either final member balances or a settlement
/// transfer plan to stdout.
#[derive(Debug, Parser)]
#[command(name = "group-ledger")]
#[command(about = "Process group ledger events and compute balances or settlement transfers")]
pub struct CliArgs {
    /// Path to the input CSV file containing ledger events
    #[arg(value_name = "INPUT")]
    pub input_file: PathBuf,

    /// Processing strategy to use
    #[arg(long, value_enum, default_value = "async")]
    pub strategy: StrategyType,

    /// Number of events per batch (async strategy only)
    #[arg(long = "batch-size")]
    pub batch_size: Option<usize>,

    /// Maximum number of worker threads (async strategy only)
    #[arg(long = "max-concurrent")]
    pub max_concurrent_batches: Option<usize>,

    /// How group expenses are split among members
    #[arg(long = "split-policy", value_enum, default_value = "current-members")]
    pub split_policy: SplitPolicy,

    /// What to write to stdout after processing
    #[arg(long = "emit", value_enum, default_value = "balances")]
    pub emit: EmitMode,
}

impl CliArgs {
    /// Build a BatchConfig from the optional CLI overrides
    ///
    /// Falls back to defaults when a flag is absent. Zero values are
    /// rejected by BatchConfig::new with a stderr warning and replaced
    /// by the corresponding default.
    pub fn to_batch_config(&self) -> BatchConfig {
        let default = BatchConfig::default();

        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_batches
                .unwrap_or(default.max_concurrent_batches),
        )
    }
}
