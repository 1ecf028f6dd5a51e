//! The catalog store collaborator.
//!
//! Query execution belongs to the store. The core only needs four narrow
//! operations, captured by [`CatalogStore`]. [`MemoryStore`] implements them over
//! in-memory tables.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
use thiserror::Error;

use crate::catalog::{SourceId, schema};
use crate::error::{CatalogError, Result};
use crate::table::{Table, TableSet, Value};

/// Row access to the catalog.
///
/// Implementations report their own failures as [`CatalogError::Upstream`].
pub trait CatalogStore {
    /// Run a read query.
    fn query(&self, sql: &str) -> Result<Table>;

    /// All rows of one table.
    fn table(&self, name: &str) -> Result<Table>;

    /// Every table row that references `source_id`, grouped by table.
    ///
    /// Tables without matching rows are left out. Without a matching `sources`
    /// row there is no `sources` table in the result.
    fn inventory(&self, source_id: SourceId) -> Result<TableSet>;

    /// Column structure of every table, sorted by table name.
    ///
    /// Each result table is named after the catalog table it describes and has
    /// one `(cid, name)` row per column.
    fn schema(&self) -> Result<TableSet>;
}

impl<S: CatalogStore + ?Sized> CatalogStore for &S {
    fn query(&self, sql: &str) -> Result<Table> {
        (**self).query(sql)
    }

    fn table(&self, name: &str) -> Result<Table> {
        (**self).table(name)
    }

    fn inventory(&self, source_id: SourceId) -> Result<TableSet> {
        (**self).inventory(source_id)
    }

    fn schema(&self) -> Result<TableSet> {
        (**self).schema()
    }
}

/// Failures of [`MemoryStore`].
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// No result was registered for the query.
    #[error("could not execute query: {0}")]
    UnknownQuery(String),
    /// No table with this name.
    #[error("no such table: {0}")]
    UnknownTable(String),
}

/// Catalog held in memory.
///
/// Queries are not parsed: each query text answers with a result registered
/// through [`with_query`](MemoryStore::with_query).
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: TableSet,
    queries: HashMap<String, Table>,
}

impl MemoryStore {
    /// Store over `tables`.
    pub fn new(tables: TableSet) -> Self {
        Self {
            tables,
            queries: HashMap::new(),
        }
    }

    /// Register the result of a query. Whitespace at either end is ignored.
    pub fn with_query(mut self, sql: &str, result: Table) -> Self {
        self.queries.insert(sql.trim().to_owned(), result);
        self
    }
}

impl CatalogStore for MemoryStore {
    fn query(&self, sql: &str) -> Result<Table> {
        self.queries
            .get(sql.trim())
            .cloned()
            .ok_or_else(|| CatalogError::upstream(MemoryStoreError::UnknownQuery(sql.to_owned())))
    }

    fn table(&self, name: &str) -> Result<Table> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::upstream(MemoryStoreError::UnknownTable(name.to_owned())))
    }

    fn inventory(&self, source_id: SourceId) -> Result<TableSet> {
        let inventory: TableSet = self
            .tables
            .iter()
            .map(|table| {
                let key = if table.name() == schema::SOURCES {
                    schema::ID
                } else {
                    schema::SOURCE_ID
                };
                table.filter(|row| row.get(key).as_i64() == Some(source_id))
            })
            .filter(|table| !table.is_empty())
            .collect();
        debug!(
            "Inventory of {source_id} spans {} tables.",
            inventory.len()
        );
        Ok(inventory)
    }

    fn schema(&self) -> Result<TableSet> {
        Ok(self
            .tables
            .iter()
            .sorted_by(|a, b| a.name().cmp(b.name()))
            .map(|table| {
                table.columns().iter().enumerate().fold(
                    Table::new(table.name(), [CID, COLUMN_NAME]),
                    |info, (cid, column)| {
                        info.with_row([Value::from(cid as i64), column.as_str().into()])
                    },
                )
            })
            .collect())
    }
}

/// Column position in a schema table.
const CID: &str = "cid";
/// Column name in a schema table.
const COLUMN_NAME: &str = "name";
