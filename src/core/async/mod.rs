//! Concurrent implementations of core components
//!
//! This module provides thread-safe, concurrent implementations of the core
//! ledger processing components using DashMap for locking.
//!
//! # Architecture
//!
//! The async implementations mirror the synchronous versions but with
//! concurrent data structures:
//!
//! - **AsyncAccountStore**: Thread-safe balances and transaction records
//! - **AsyncEntryStore**: Thread-safe ledger entry storage
//! - **AsyncLedgerEngine**: Orchestrates concurrent event processing
//! - **BatchProcessor**: Member-partitioned batch execution
//!
//! # Thread Safety
//!
//! All components are designed for safe concurrent access:
//! - Operations on different accounts/entries proceed in parallel
//! - Writes to the same account are arbitrated by a conditional write
//! - No global locks on hot paths; fine-grained locking per entity

pub mod account_store;
pub mod batch_processor;
pub mod engine;
pub mod entry_store;

pub use account_store::AsyncAccountStore;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::AsyncLedgerEngine;
pub use entry_store::AsyncEntryStore;
