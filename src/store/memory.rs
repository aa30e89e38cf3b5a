use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{Row, StoreError, TabularStore};

/// In-memory [`TabularStore`] used by tests and dev mode. Tables are plain
/// row vectors behind one lock; semantics match the sheet adapter (1-based
/// positions, header row first, whole-row overwrites).
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, Vec<Row>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All known tables with their header rows and no data — the blank-sheet
    /// starting state dev mode and tests build on.
    pub fn seeded() -> Self {
        use crate::records::schema::{
            AdminEntry, AuditLogEntry, Customer, Deal, Partner, User, tables,
        };

        let header = |columns: &[&str]| -> Vec<Row> {
            vec![columns.iter().map(|c| (*c).to_owned()).collect()]
        };
        Self::with_tables(vec![
            (tables::DEALS, header(Deal::COLUMNS)),
            (tables::CUSTOMERS, header(Customer::COLUMNS)),
            (tables::PARTNERS, header(Partner::COLUMNS)),
            (tables::USERS, header(User::COLUMNS)),
            (tables::ADMINS, header(AdminEntry::COLUMNS)),
            (tables::AUDIT_LOG, header(AuditLogEntry::COLUMNS)),
        ])
    }

    /// Seed tables, each given as its full row list including the header.
    pub fn with_tables(tables: Vec<(&str, Vec<Row>)>) -> Self {
        let map = tables
            .into_iter()
            .map(|(name, rows)| (name.to_owned(), rows))
            .collect();
        Self {
            tables: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl TabularStore for MemoryStore {
    async fn rows(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::Unavailable(format!("no such table: {table}")))
    }

    async fn append_row(&self, table: &str, row: Row) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::Unavailable(format!("no such table: {table}")))?;
        rows.push(row);
        Ok(())
    }

    async fn update_row(&self, table: &str, position: u32, row: Row) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::Unavailable(format!("no such table: {table}")))?;
        let idx = position
            .checked_sub(1)
            .map(|p| p as usize)
            .filter(|p| *p < rows.len())
            .ok_or(StoreError::BadPosition {
                table: table.to_owned(),
                position,
            })?;
        rows[idx] = row;
        Ok(())
    }
}
