//! I/O module
//!
//! Handles input parsing and report output.
//!
//! # Components
//!
//! - `line_format` - Line format handling (record conversion, report serialization)
//! - `sync_reader` - Synchronous reader with iterator interface
//! - `async_reader` - Asynchronous reader with one-record-at-a-time interface

pub mod async_reader;
pub mod line_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use line_format::{convert_fields, write_balances};
pub use sync_reader::SyncReader;
