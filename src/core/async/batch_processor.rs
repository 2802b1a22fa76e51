//! Batch processing with member-based partitioning for async event processing
//!
//! This module provides the `BatchProcessor` struct, which manages concurrent
//! batch processing with member-based partitioning to enable parallel
//! processing while maintaining per-member event ordering.
//!
//! # Design
//!
//! The `BatchProcessor` partitions batches by member ID, allowing events for
//! different members to be processed concurrently while maintaining
//! sequential ordering for each individual member's events. Ordering matters:
//! a reversal must see its apply, an unsettle must see its settle.
//!
//! Group-model events (member, expense) are the exception: they mutate the
//! shared group, and an expense's membership snapshot depends on which joins
//! precede it. Each batch applies them sequentially in batch order before
//! fanning out the per-member partitions.
//!
//! # Thread Safety
//!
//! The processor is cloneable and can be safely shared across async tasks.
//! All internal state is protected by Arc, and the underlying engine uses
//! thread-safe components.

use std::collections::HashMap;
use std::sync::Arc;

use super::AsyncLedgerEngine;
use crate::types::{EventRecord, EventType, LedgerError, MemberId};

/// Result of processing a single event
///
/// Contains the original event record and the result of processing it.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The event record that was processed
    pub record: EventRecord,

    /// The result of processing (success or error)
    pub result: Result<(), LedgerError>,
}

/// Batch processor with member-based partitioning
///
/// `BatchProcessor` manages concurrent batch processing by partitioning
/// events by member ID. This enables parallel processing of events for
/// different members while maintaining sequential ordering for each member.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Thread-safe event processing engine
    ///
    /// Wrapped in Arc to enable sharing across async tasks.
    engine: Arc<AsyncLedgerEngine>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `engine` - Arc-wrapped AsyncLedgerEngine for event processing
    pub fn new(engine: Arc<AsyncLedgerEngine>) -> Self {
        Self { engine }
    }

    /// Partition a batch of events by member ID
    ///
    /// This method partitions a batch into sub-batches where each sub-batch
    /// contains only events for a single member.
    ///
    /// # Guarantees
    ///
    /// - Each event appears in exactly one sub-batch
    /// - No events are lost or duplicated
    /// - Events for each member maintain their original order
    pub fn partition_by_member(
        &self,
        batch: Vec<EventRecord>,
    ) -> HashMap<MemberId, Vec<EventRecord>> {
        let mut member_batches: HashMap<MemberId, Vec<EventRecord>> = HashMap::new();

        for record in batch {
            member_batches
                .entry(record.member)
                .or_default()
                .push(record);
        }

        member_batches
    }

    /// Process all events for a single member sequentially
    ///
    /// Events are processed in the order they appear in the input vector,
    /// so per-member ordering holds even when multiple members are being
    /// processed concurrently. Errors are captured in the results and
    /// don't stop processing.
    pub async fn process_member_events(&self, events: Vec<EventRecord>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(events.len());

        for record in events {
            let result = self.engine.process(record.clone());
            results.push(ProcessingResult { record, result });
        }

        results
    }

    /// Process a batch of events with member-based partitioning
    ///
    /// This method processes a batch by:
    /// 1. Processing the batch's group-model events (member, expense)
    ///    sequentially in batch order
    /// 2. Partitioning the remaining events by member ID
    /// 3. Spawning tokio tasks to process each member's events concurrently
    /// 4. Waiting for all tasks to complete
    /// 5. Collecting and returning all results
    ///
    /// Group-model events mutate the shared group: an expense's membership
    /// snapshot depends on which joins precede it, so running them inside
    /// the concurrent per-member partitions would make snapshots depend on
    /// task scheduling. They are applied up front instead, in batch order.
    /// Account, entry, and settlement state is untouched by them, so the
    /// per-member partitions keep their ordering guarantees.
    ///
    /// Results may be in a different order than the input due to concurrent
    /// processing; within a member they keep their order.
    pub async fn process_batch(&self, batch: Vec<EventRecord>) -> Vec<ProcessingResult> {
        // Group-model events first, sequentially, in batch order
        let (group_events, account_events): (Vec<EventRecord>, Vec<EventRecord>) =
            batch.into_iter().partition(|record| {
                matches!(record.event_type, EventType::Member | EventType::Expense)
            });

        let group_results = self.process_member_events(group_events).await;

        // Partition the remaining events by member ID
        let member_batches = self.partition_by_member(account_events);

        // Spawn tokio tasks for each member's events
        let mut tasks = Vec::new();
        for (_member, events) in member_batches {
            let processor = self.clone();
            let task = tokio::spawn(async move { processor.process_member_events(events).await });
            tasks.push(task);
        }

        // Wait for all tasks to complete and collect results
        let mut results = group_results;
        for task in tasks {
            match task.await {
                Ok(member_results) => results.extend(member_results),
                Err(e) => {
                    eprintln!("Task panicked: {:?}", e);
                }
            }
        }

        results
    }
}
