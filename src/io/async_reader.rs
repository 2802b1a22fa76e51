//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over event records from a CSV source.
//! Supports batch reading for efficient async processing.
//!
//! # Design
//!
//! The AsyncEventReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio for async runtime and concurrency primitives
//! - Batch reading for efficient processing
//!
//! # Architecture
//!
//! ```text
//! CSV source → AsyncEventReader → Batches of EventRecords
//!                    ↓
//!             csv_format module
//!             (EventCsvRecord, convert_event_record)
//! ```

use crate::io::csv_format::{convert_event_record, EventCsvRecord};
use crate::types::EventRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV reader
///
/// Provides a batch reading interface over event records. Maintains
/// streaming behavior with constant memory usage.
pub struct AsyncEventReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncEventReader<R> {
    /// Create a new AsyncEventReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing CSV data
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of event records
    ///
    /// This method reads up to `batch_size` records from the CSV source,
    /// converting them to EventRecords. Invalid records are logged to
    /// stderr and skipped.
    ///
    /// # Returns
    ///
    /// A vector of successfully converted event records. Returns an
    /// empty vector when the end of the input is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<EventRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<EventCsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_event_record(csv_record) {
                    Ok(event_record) => batch.push(event_record),
                    Err(e) => eprintln!("Record conversion error: {}", e),
                },
                Some(Err(e)) => eprintln!("CSV parse error: {}", e),
                None => break,
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, EventType};
    use futures::io::Cursor;
    use rust_decimal::Decimal;

    const HEADER: &str = "type,member,entry,tx,amount,direction,kind\n";

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let csv_content = format!(
            "{HEADER}\
            apply,1,,1,100.0,increase,\n\
            apply,1,,2,50.0,decrease,\n\
            apply,2,,3,200.0,increase,\n"
        );
        let reader = Cursor::new(csv_content.into_bytes());
        let mut async_reader = AsyncEventReader::new(reader);

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].member, 1);
        assert_eq!(batch[0].tx, Some(1));
        assert_eq!(batch[1].member, 1);
        assert_eq!(batch[1].tx, Some(2));

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].member, 2);
        assert_eq!(batch[0].tx, Some(3));
    }

    #[tokio::test]
    async fn test_async_reader_empty_csv() {
        let reader = Cursor::new(HEADER.as_bytes().to_vec());
        let mut async_reader = AsyncEventReader::new(reader);

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 0);
    }

    #[tokio::test]
    async fn test_async_reader_skips_invalid_record() {
        let csv_content = format!(
            "{HEADER}\
            teleport,1,,1,100.0,,\n\
            apply,1,,2,50.0,increase,\n"
        );
        let reader = Cursor::new(csv_content.into_bytes());
        let mut async_reader = AsyncEventReader::new(reader);

        // Invalid event type is logged to stderr and skipped
        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].tx, Some(2));
    }

    #[tokio::test]
    async fn test_async_reader_settlement_lifecycle_rows() {
        let csv_content = format!(
            "{HEADER}\
            apply,1,,1,1000.0,increase,\n\
            entry,1,1,,200.0,,credit\n\
            settle,1,1,,,,\n\
            unsettle,1,1,,,,\n"
        );
        let reader = Cursor::new(csv_content.into_bytes());
        let mut async_reader = AsyncEventReader::new(reader);

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 4);
        assert_eq!(batch[0].amount, Some(Decimal::new(10000, 1)));
        assert_eq!(batch[0].direction, Some(Direction::Increase));
        assert_eq!(batch[2].event_type, EventType::Settle);
        assert_eq!(batch[2].amount, None);
        assert_eq!(batch[3].event_type, EventType::Unsettle);
    }

    #[tokio::test]
    async fn test_async_reader_batch_size_larger_than_records() {
        let csv_content = format!("{HEADER}member,1,,,,,\n");
        let reader = Cursor::new(csv_content.into_bytes());
        let mut async_reader = AsyncEventReader::new(reader);

        let batch = async_reader.read_batch(100).await;
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn test_async_reader_multiple_batches() {
        let csv_content = format!(
            "{HEADER}\
            apply,1,,1,100.0,increase,\n\
            apply,1,,2,200.0,increase,\n\
            apply,1,,3,300.0,increase,\n\
            apply,1,,4,400.0,increase,\n\
            apply,1,,5,500.0,increase,\n"
        );
        let reader = Cursor::new(csv_content.into_bytes());
        let mut async_reader = AsyncEventReader::new(reader);

        let batch1 = async_reader.read_batch(2).await;
        assert_eq!(batch1.len(), 2);
        assert_eq!(batch1[0].tx, Some(1));
        assert_eq!(batch1[1].tx, Some(2));

        let batch2 = async_reader.read_batch(2).await;
        assert_eq!(batch2.len(), 2);
        assert_eq!(batch2[0].tx, Some(3));
        assert_eq!(batch2[1].tx, Some(4));

        let batch3 = async_reader.read_batch(2).await;
        assert_eq!(batch3.len(), 1);
        assert_eq!(batch3[0].tx, Some(5));

        let batch4 = async_reader.read_batch(2).await;
        assert_eq!(batch4.len(), 0);
    }

    #[tokio::test]
    async fn test_async_reader_whitespace_handling() {
        let csv_content = format!("{HEADER}  apply  ,  1  ,  ,  1  ,  100.0  ,  increase  ,  \n");
        let reader = Cursor::new(csv_content.into_bytes());
        let mut async_reader = AsyncEventReader::new(reader);

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].member, 1);
        assert_eq!(batch[0].tx, Some(1));
    }
}
