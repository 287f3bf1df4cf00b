//! Call-log spreadsheet: the append capability and its Google Sheets backend.

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::{GoogleSheetsClient, GoogleSheetsConfig, ServiceAccountKey};
pub use error::SheetError;
pub use types::{CallLogEntry, SheetValue};

/// Appends one call-log row. Single attempt, no retry.
#[async_trait]
pub trait CallLogSink: Send + Sync {
    async fn append_log_row(&self, entry: &CallLogEntry) -> Result<(), SheetError>;
}
