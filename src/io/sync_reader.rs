//! Synchronous input reader with iterator interface
//!
//! Provides a streaming iterator over input records from a file.
//! Delegates format concerns to the line_format module.
//!
//! # Design
//!
//! The SyncReader uses a `csv::Reader` configured for space-separated,
//! header-less lines of varying length. Lines are read one at a time into a
//! reused `StringRecord`, so memory stays constant however long the input is.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<InputRecord, SimulationError>` for each non-blank line:
//!
//! ```no_run
//! use bank_simulator::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("input.txt")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("Read record: {:?}", record),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Malformed lines are yielded as recoverable Err variants
//! - Line numbers are included in error messages for debugging

use crate::io::line_format::convert_fields;
use crate::types::{InputRecord, SimulationError};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Synchronous input reader
#[derive(Debug)]
pub struct SyncReader<R = File> {
    reader: csv::Reader<R>,
    record: StringRecord,
}

impl SyncReader<File> {
    /// Open an input file for streaming iteration
    ///
    /// # Errors
    ///
    /// * `FileNotFound` if nothing exists at `path`
    /// * `IoError` if the file exists but cannot be opened
    pub fn new(path: &Path) -> Result<Self, SimulationError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SimulationError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => SimulationError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), e),
            },
        })?;

        Ok(Self::from_reader(file))
    }
}

impl<R: Read> SyncReader<R> {
    /// Read input from any byte source
    pub fn from_reader(source: R) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .buffer_capacity(8 * 1024)
            .from_reader(source);

        Self {
            reader,
            record: StringRecord::new(),
        }
    }
}

impl<R: Read> Iterator for SyncReader<R> {
    type Item = Result<InputRecord, SimulationError>;

    /// Get the next input record, skipping blank lines
    ///
    /// # Returns
    ///
    /// * `Some(Ok(InputRecord))` - Successfully parsed record
    /// * `Some(Err(SimulationError))` - Malformed line or read failure
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => {
                    let line = self.record.position().map_or(0, |pos| pos.line());
                    if let Some(item) = convert_fields(self.record.iter(), line).transpose() {
                        return Some(item);
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobSpec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary input file for testing
    fn create_temp_input(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_new_opens_file() {
        let file = create_temp_input("a1 type personal\n");

        assert!(SyncReader::new(file.path()).is_ok());
    }

    #[test]
    fn test_sync_reader_new_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.txt"));

        assert_eq!(
            result.unwrap_err(),
            SimulationError::FileNotFound {
                path: "nonexistent.txt".to_string()
            }
        );
    }

    #[test]
    fn test_sync_reader_iterates_accounts_then_transactions() {
        let file = create_temp_input("a1 type personal\na2 type business\nd1 d a1 100\n");

        let records: Vec<_> = SyncReader::new(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 3);
        assert!(matches!(&records[0], InputRecord::Account(spec) if spec.id == "a1"));
        assert!(matches!(&records[1], InputRecord::Account(spec) if spec.kind == "business"));
        assert!(matches!(
            &records[2],
            InputRecord::Transaction(spec) if spec.jobs == vec![JobSpec::Deposit { account: "a1".to_string(), amount: 100 }]
        ));
    }

    #[test]
    fn test_sync_reader_skips_blank_lines() {
        let file = create_temp_input("a1 type personal\n\n   \nd1 d a1 100\n\n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(Result::is_ok));
    }

    #[test]
    fn test_sync_reader_includes_line_numbers_in_errors() {
        let file = create_temp_input("a1 type personal\nd1 d a1 100\nc1 w a1 lots\nc2 w a1 5\n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 4);
        assert!(records[0].is_ok());
        assert!(records[1].is_ok());
        assert_eq!(
            records[2].as_ref().unwrap_err(),
            &SimulationError::invalid_amount("lots", 3)
        );
        assert!(records[3].is_ok());
    }

    #[test]
    fn test_sync_reader_handles_crlf_and_padding() {
        let file = create_temp_input("a1  type   personal \r\n  d1 d a1 100\r\n");

        let records: Vec<_> = SyncReader::new(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(matches!(&records[0], InputRecord::Account(spec) if spec.kind == "personal"));
    }

    #[test]
    fn test_sync_reader_handles_missing_trailing_newline() {
        let file = create_temp_input("a1 type personal\nd1 d a1 100");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_sync_reader_empty_file() {
        let file = create_temp_input("");

        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_sync_reader_from_bytes() {
        let reader = SyncReader::from_reader("a1 type savings\n".as_bytes());

        assert_eq!(reader.count(), 1);
    }
}
