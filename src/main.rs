//! Group Ledger CLI
//!
//! Command-line interface for processing group ledger events from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- events.csv > balances.csv
//! cargo run -- --strategy sync events.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 events.csv > balances.csv
//! cargo run -- --emit transfers events.csv > transfers.csv
//! cargo run -- --split-policy snapshot-at-entry --emit transfers events.csv
//! ```
//!
//! The program reads ledger events from the input CSV file, processes them
//! through the ledger engine using the selected processing strategy, and
//! writes either final member balances or the settlement transfer plan to
//! stdout.
//!
//! # Processing Strategies
//!
//! - **sync**: Synchronous CSV parsing with single-threaded processing
//! - **async**: Asynchronous batch processing with multi-threaded parallelism (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use group_ledger::cli;
use group_ledger::strategy;
use std::process;

fn main() {
    let args = cli::parse_args();

    // Build the processing strategy from CLI arguments
    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, args.split_policy, args.emit, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
