//! Core business logic module
//!
//! This module contains the core ledger processing components:
//! - `traits` - Trait abstractions for interchangeable implementations
//! - `engine` - Event processing orchestration
//! - `account_store` - Account balances and transaction records
//! - `entry_store` - Ledger entry storage for the settlement lifecycle
//! - `group` - Member set and shared expenses
//! - `settlement` - Pure settlement computation (net positions, transfers)
//! - `async` - Concurrent implementations for batch processing

pub mod account_store;
pub mod r#async;
pub mod engine;
pub mod entry_store;
pub mod group;
pub mod settlement;
pub mod traits;

pub use account_store::InMemoryAccountStore;
pub use engine::LedgerEngine;
pub use entry_store::InMemoryEntryStore;
pub use group::Group;
pub use r#async::{AsyncAccountStore, AsyncEntryStore, AsyncLedgerEngine, BatchProcessor};
pub use settlement::SETTLEMENT_EPSILON;
