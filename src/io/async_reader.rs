//! Asynchronous input reader
//!
//! Provides a streaming interface over input records for the async strategy.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming, space-separated line splitting
//! - the line_format module for turning fields into records
//!
//! # Architecture
//!
//! ```text
//! AsyncRead → AsyncReader → InputRecord, one line at a time
//!                 ↓
//!         line_format module
//!         (convert_fields)
//! ```

use crate::io::line_format::convert_fields;
use crate::types::{InputRecord, SimulationError};
use csv_async::{AsyncReaderBuilder, StringRecord, Trim};
use futures::io::AsyncRead;

/// Asynchronous input reader
///
/// Yields records one line at a time so the caller can launch each
/// transaction before the next line is read.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    reader: csv_async::AsyncReader<R>,
    record: StringRecord,
    line: u64,
}

impl<R: AsyncRead + Unpin + Send> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let reader = AsyncReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .create_reader(reader);

        Self {
            reader,
            record: StringRecord::new(),
            line: 0,
        }
    }

    /// Read the next input record, skipping blank lines
    ///
    /// # Returns
    ///
    /// * `Some(Ok(InputRecord))` - Successfully parsed record
    /// * `Some(Err(SimulationError))` - Malformed line or read failure
    /// * `None` - End of input reached
    pub async fn next_record(&mut self) -> Option<Result<InputRecord, SimulationError>> {
        loop {
            match self.reader.read_record(&mut self.record).await {
                Ok(false) => return None,
                Ok(true) => {
                    self.line = self
                        .record
                        .position()
                        .map_or(self.line + 1, |pos| pos.line());
                    if let Some(item) = convert_fields(self.record.iter(), self.line).transpose() {
                        return Some(item);
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
