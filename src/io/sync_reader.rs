//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over event records from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncEventReader uses csv::Reader to read and deserialize CSV records
//! sequentially, delegating parsing and conversion to the csv_format module.
//! It maintains streaming behavior by processing CSV records one at a time
//! without loading the entire file into memory.
//!
//! # Iterator Interface
//!
//! SyncEventReader implements the Iterator trait, yielding
//! Result<EventRecord, String> for each CSV row:
//!
//! ```no_run
//! use group_ledger::io::sync_reader::SyncEventReader;
//! use std::path::Path;
//!
//! let reader = SyncEventReader::new(Path::new("events.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("Processing event: {:?}", record),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record parsing errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging

use crate::io::csv_format::{convert_event_record, EventCsvRecord};
use crate::types::EventRecord;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over event records. Maintains streaming
/// behavior with constant memory usage.
#[derive(Debug)]
pub struct SyncEventReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncEventReader {
    /// Create a new SyncEventReader from a file path
    ///
    /// Opens the CSV file and prepares it for streaming iteration.
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (for the optional trailing columns)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Returns
    ///
    /// * `Ok(SyncEventReader)` if file opened successfully
    /// * `Err(String)` if file could not be opened
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncEventReader {
    type Item = Result<EventRecord, String>;

    /// Get the next event record from the CSV file
    ///
    /// Reads the next CSV row, deserializes it to EventCsvRecord, and
    /// converts it to an EventRecord. Line numbers are included in error
    /// messages for debugging.
    ///
    /// # Returns
    ///
    /// * `Some(Ok(EventRecord))` - Successfully parsed record
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<EventCsvRecord>();

        match deserializer.next()? {
            Ok(csv_record) => {
                self.line_num += 1;
                // Add line number context to any conversion errors
                Some(
                    convert_event_record(csv_record)
                        .map_err(|e| format!("Line {}: {}", self.line_num + 1, e)),
                )
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(format!(
                    "Line {}: CSV parse error: {}",
                    self.line_num + 1,
                    e
                )))
            }
        }
    }
}
