use serde::{Deserialize, Serialize};

/// Table names must be strictly shorter than this many bytes.
pub const MAX_TABLE_NAME_LENGTH: usize = 256;
/// Column names must be strictly shorter than this many bytes.
pub const MAX_COLUMN_NAME_LENGTH: usize = 256;
/// Maximum number of columns a table may declare.
pub const MAX_COLUMNS: usize = 32;

/// Represents the type of a column in a table schema.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Text,
    Float,
}

impl ColumnType {
    /// Returns true if `value` is a valid literal for this type.
    pub fn accepts(self, value: &str) -> bool {
        match self {
            ColumnType::Int => value.parse::<i64>().is_ok(),
            ColumnType::Float => value.parse::<f64>().is_ok(),
            ColumnType::Text => true,
        }
    }
}

/// Maps a (case-sensitive) type keyword to a column type.
pub fn convert_type(keyword: &str) -> Option<ColumnType> {
    match keyword {
        "int" => Some(ColumnType::Int),
        "text" => Some(ColumnType::Text),
        "float" => Some(ColumnType::Float),
        _ => None,
    }
}

/// Represents a column in a schema (name and type).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub col_type: ColumnType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        ColumnSchema {
            name: name.into(),
            col_type,
        }
    }
}

/// Represents the schema of a table: its name and ordered column list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Schema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

impl Schema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Schema {
            name: name.into(),
            columns,
        }
    }

    /// Position of the first column called `name`.
    ///
    /// Column names are not required to be unique, so later duplicates are
    /// never addressed by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}
