//! Tabular data exchanged with the catalog store.
//!
//! The store hands back rows as column-name/value mappings grouped by table name.
//! [`Table`] keeps the column order the store returned, [`TableSet`] keeps the
//! table order, and [`DisplayTable`] is the string form handed to the renderer.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::error::{CatalogError, Result};

/// A single cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value. Never coerced to zero.
    #[default]
    Null,
    /// Integer cell.
    Integer(i64),
    /// Floating point cell.
    Real(f64),
    /// Text cell.
    Text(String),
}

static NULL: Value = Value::Null;

impl Value {
    /// Whether the cell is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric coercion. Text is parsed, `Null` stays missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Integer coercion. Reals only convert when they hold an integral value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(*i),
            Value::Real(r) if r.is_finite() && r.fract() == 0. => Some(*r as i64),
            Value::Real(_) => None,
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Borrow a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A named table with ordered columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, builder style.
    ///
    /// # Panics
    /// If the number of values differs from the number of columns.
    pub fn with_row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let row = values.into_iter().map(Into::into).collect_vec();
        assert_eq!(
            row.len(),
            self.columns.len(),
            "row width must match the column count of `{}`",
            self.name
        );
        self.rows.push(row);
        self
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(CatalogError::DataIntegrity(format!(
                "table `{}` has {} columns but a row has {} values",
                self.name,
                self.columns.len(),
                row.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in store order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the table has a column called `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the rows.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = RowRef<'_>> {
        self.rows.iter().map(|values| RowRef {
            columns: &self.columns,
            values,
        })
    }

    /// Borrow a single row.
    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        self.rows.get(index).map(|values| RowRef {
            columns: &self.columns,
            values,
        })
    }

    /// Copy of this table keeping only the rows matching `predicate`.
    pub fn filter(&self, mut predicate: impl FnMut(&RowRef<'_>) -> bool) -> Table {
        let rows = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.values.to_vec())
            .collect();
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows,
        }
    }

    /// String form for the renderer.
    pub fn display(&self) -> DisplayTable {
        DisplayTable {
            title: self.name.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    /// One line per row, fields separated by `sep`.
    pub fn to_delimited(&self, sep: char) -> String {
        export_rows(self.rows(), sep)
    }
}

/// A borrowed row of a [`Table`].
#[derive(Clone, Copy, Debug)]
pub struct RowRef<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    /// Value of `column`, or `Null` when the table has no such column.
    pub fn get(&self, column: &str) -> &'a Value {
        self.columns
            .iter()
            .position(|c| c == column)
            .map_or(&NULL, |i| &self.values[i])
    }

    /// Values in column order.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Column names.
    pub fn columns(&self) -> &'a [String] {
        self.columns
    }
}

/// Join the given rows into delimited text, one line per row.
///
/// Used to export rows the user selected in a result listing.
pub fn export_rows<'a>(rows: impl IntoIterator<Item = RowRef<'a>>, sep: char) -> String {
    let sep = sep.to_string();
    rows.into_iter()
        .map(|row| row.values().iter().join(&sep))
        .map(|line| line + "\n")
        .collect()
}

/// Tables keyed by name, in the order the store returned them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TableSet {
    tables: Vec<Table>,
}

impl TableSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any table with the same name in place.
    pub fn insert(&mut self, table: Table) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    /// Builder form of [`insert`](TableSet::insert).
    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    /// Look up a table by name.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Iterate over the tables in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Table> {
        self.tables.iter()
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether there are no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<Table> for TableSet {
    fn from_iter<T: IntoIterator<Item = Table>>(iter: T) -> Self {
        let mut set = TableSet::new();
        for table in iter {
            set.insert(table);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TableSet {
    type Item = &'a Table;
    type IntoIter = std::slice::Iter<'a, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

/// A table rendered to strings, tagged with its title.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplayTable {
    /// Table name.
    pub title: String,
    /// Column headers.
    pub columns: Vec<String>,
    /// Cell strings, row major.
    pub rows: Vec<Vec<String>>,
}
