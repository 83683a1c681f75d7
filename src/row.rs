use crate::schema::Schema;
use serde::{Deserialize, Serialize};
// row.rs

/// Trait defining the interface for a row in a table.
pub trait RowInterface {
    /// Returns the row's fields, one per column, in column order.
    fn get_values(&self) -> Vec<&str>;
    /// Returns the row exactly as it was inserted.
    fn render(&self) -> &str;
}

/// Struct representing a single row in a table.
/// The raw value string is stored verbatim; fields are its
/// whitespace-separated parts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Row {
    raw: String,
}

impl Row {
    /// Creates a new Row from the raw value string.
    pub fn new(raw: impl Into<String>) -> Self {
        Row { raw: raw.into() }
    }

    /// Get a field by column name using the schema.
    pub fn get_by_name<'a>(&'a self, col_name: &str, schema: &Schema) -> Option<&'a str> {
        schema.column_index(col_name).and_then(|idx| self.field(idx))
    }

    /// The field at column position `idx`, if the row has that many.
    pub fn field(&self, idx: usize) -> Option<&str> {
        self.raw.split_whitespace().nth(idx)
    }

    /// Case-sensitive substring match against the rendered row.
    pub fn contains(&self, filter: &str) -> bool {
        self.raw.contains(filter)
    }
}

impl RowInterface for Row {
    fn get_values(&self) -> Vec<&str> {
        self.raw.split_whitespace().collect()
    }

    fn render(&self) -> &str {
        &self.raw
    }
}
