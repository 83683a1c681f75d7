use crate::error::StoreError;
use crate::schema::{ColumnType, Schema};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
// table.rs
/// Trait defining the interface for a table.
/// Provides methods to add, delete, select and sort rows.
pub trait TableInterface {
    /// Appends a row and returns its 1-based index.
    fn add_row(&mut self, raw: &str, strict: bool) -> Result<usize, StoreError>;
    /// Removes the row at the 1-based `index`; later rows shift down by one.
    fn delete_row(&mut self, index: i64) -> Result<Row, StoreError>;
    /// Returns the rendered rows, optionally restricted to those containing `filter`.
    fn select_rows(&self, filter: Option<&str>) -> Vec<String>;
    /// Stable-sorts the rows by `column` and returns them in their new order.
    fn sort_by_column(&mut self, column: &str) -> Result<Vec<String>, StoreError>;
}

use crate::row::{Row, RowInterface};

/// Struct representing a table in the store.
/// Stores the owner, the schema and the rows in positional order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Table {
    owner: u64,
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl Table {
    /// Creates a new, empty table owned by `owner`.
    pub fn new(owner: u64, schema: Schema) -> Self {
        Table {
            owner,
            schema,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn owner(&self) -> u64 {
        self.owner
    }

    /// Checks the row's arity and field types against the schema.
    fn check_row(&self, raw: &str) -> Result<(), StoreError> {
        let values: Vec<&str> = raw.split_whitespace().collect();
        if values.len() != self.schema.columns.len() {
            return Err(StoreError::ColumnCountMismatch {
                expected: self.schema.columns.len(),
                actual: values.len(),
            });
        }
        for (col, val) in self.schema.columns.iter().zip(values) {
            if !col.col_type.accepts(val) {
                return Err(StoreError::TypeMismatch {
                    column: col.name.clone(),
                    value: val.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl TableInterface for Table {
    fn add_row(&mut self, raw: &str, strict: bool) -> Result<usize, StoreError> {
        if strict {
            self.check_row(raw)?;
        }
        self.rows.push(Row::new(raw));
        Ok(self.rows.len())
    }

    fn delete_row(&mut self, index: i64) -> Result<Row, StoreError> {
        let len = self.rows.len();
        match usize::try_from(index) {
            Ok(i) if (1..=len).contains(&i) => Ok(self.rows.remove(i - 1)),
            _ => Err(StoreError::RowOutOfRange { index, len }),
        }
    }

    fn select_rows(&self, filter: Option<&str>) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| filter.is_none_or(|f| row.contains(f)))
            .map(|row| row.render().to_string())
            .collect()
    }

    fn sort_by_column(&mut self, column: &str) -> Result<Vec<String>, StoreError> {
        let idx = self
            .schema
            .column_index(column)
            .ok_or_else(|| StoreError::ColumnNotFound(column.to_string()))?;
        let col_type = self.schema.columns[idx].col_type;
        let mut keyed: Vec<(SortKey, Row)> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| (SortKey::new(col_type, row.field(idx)), row))
            .collect();
        // slice::sort_by is stable, so equal keys keep their relative order
        keyed.sort_by(|a, b| a.0.cmp_key(&b.0));
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();
        Ok(self.select_rows(None))
    }
}

/// Sort key of one field, extracted once per row.
///
/// Numeric columns compare parsed values; fields that are missing or do not
/// parse sort after every numeric field and compare as text among themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Int(i64),
    Float(f64),
    Raw(String),
}

impl SortKey {
    pub fn new(col_type: ColumnType, field: Option<&str>) -> Self {
        let raw = field.unwrap_or("");
        let parsed = match col_type {
            ColumnType::Int => raw.parse().ok().map(SortKey::Int),
            ColumnType::Float => raw.parse().ok().map(SortKey::Float),
            ColumnType::Text => None,
        };
        parsed.unwrap_or_else(|| SortKey::Raw(raw.to_string()))
    }

    pub fn cmp_key(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Int(a), SortKey::Int(b)) => a.cmp(b),
            (SortKey::Float(a), SortKey::Float(b)) => a.total_cmp(b),
            (SortKey::Raw(a), SortKey::Raw(b)) => a.cmp(b),
            (SortKey::Raw(_), _) => Ordering::Greater,
            (_, SortKey::Raw(_)) => Ordering::Less,
            // a column only yields one numeric kind
            _ => Ordering::Equal,
        }
    }
}
