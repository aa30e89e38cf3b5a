pub mod memory;
pub mod sheets;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TabularStore>,
    pub config: Arc<Config>,
}

/// A single sheet row. Cells are untyped strings; empty string means absent.
pub type Row = Vec<String>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("no row at position {position} in table {table}")]
    BadPosition { table: String, position: u32 },

    #[error("{0}")]
    Schema(String),
}

/// Row located by a column scan. `position` is the 1-based sheet position
/// (the header occupies position 1, data rows start at 2) and is what
/// [`TabularStore::update_row`] expects for a later in-place overwrite.
#[derive(Debug, Clone)]
pub struct FoundRow {
    pub position: u32,
    pub header: Row,
    pub row: Row,
}

/// Contract over the external header-indexed tabular backing store.
///
/// The store offers exactly three primitives — whole-table scan, append, and
/// whole-row overwrite by position — and promises nothing else: no
/// transactions, no uniqueness or foreign-key enforcement, no locking.
/// Every check-then-act sequence built on top of it (customer de-dup,
/// approve-after-read) has a race window between the read and the write.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// All rows of a table, header row first. Column order is whatever the
    /// header says; callers must not assume positions.
    async fn rows(&self, table: &str) -> Result<Vec<Row>, StoreError>;

    /// Append one row. Cells must already be in header order.
    async fn append_row(&self, table: &str, row: Row) -> Result<(), StoreError>;

    /// Overwrite the row at a 1-based position (position 1 is the header).
    async fn update_row(&self, table: &str, position: u32, row: Row) -> Result<(), StoreError>;

    /// First row whose cell in `column` equals `value` exactly
    /// (case-sensitive). Returns the header alongside so the caller can
    /// reconstruct a named record, plus the position for a later update.
    async fn find_row_by_column(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<FoundRow>, StoreError> {
        let rows = self.rows(table).await?;
        let mut iter = rows.into_iter();
        let Some(header) = iter.next() else {
            return Ok(None);
        };
        let Some(col_idx) = header.iter().position(|c| c == column) else {
            return Err(StoreError::Schema(format!(
                "table {table} has no column {column}"
            )));
        };

        for (i, row) in iter.enumerate() {
            if row.get(col_idx).map(String::as_str) == Some(value) {
                return Ok(Some(FoundRow {
                    // enumerate is 0-based over data rows; sheet positions
                    // are 1-based with the header at 1
                    position: u32::try_from(i).unwrap_or(u32::MAX).saturating_add(2),
                    header,
                    row,
                }));
            }
        }
        Ok(None)
    }
}

/// Generate an opaque record id: millisecond timestamp (lower hex) plus a
/// random hex suffix. Effectively unique; not cryptographically secure and
/// not formally collision-free.
pub fn generate_id() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{:x}-{}", Utc::now().timestamp_millis(), hex::encode(bytes))
}

/// Current time in the one serialization every *_at column uses:
/// RFC 3339 UTC with seconds precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
