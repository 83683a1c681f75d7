// command.rs
//
// Parsing of command bodies. Every verb starts with the table name; what
// follows depends on the verb, so each one has its own parse function.

use crate::schema::{
    convert_type, ColumnSchema, Schema, MAX_COLUMNS, MAX_COLUMN_NAME_LENGTH, MAX_TABLE_NAME_LENGTH,
};
use thiserror::Error;

/// A malformed command body. The `Display` text is the response sent to the
/// client, word for word.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("ERROR: No data provided for create_table")]
    NoData,
    #[error("ERROR: No table name provided")]
    NoTableName,
    #[error("ERROR: Table name too long")]
    TableNameTooLong,
    #[error("ERROR: Invalid format for column: {0}")]
    InvalidColumnFormat(String),
    #[error("ERROR: Column name too long: {0}")]
    ColumnNameTooLong(String),
    #[error("ERROR: Invalid column type '{0}'")]
    InvalidColumnType(String),
    #[error("ERROR: Too many columns specified")]
    TooManyColumns,
    #[error("ERROR: No columns specified")]
    NoColumns,
    #[error("ERROR: Invalid format. Expected {{table_name}} {{value1}} {{value2}}...")]
    AddRecordFormat,
    #[error("ERROR: Invalid format. Expected {{table_name}} {{index}}")]
    DeleteRecordFormat,
    #[error("ERROR: Invalid format. Expected {{table_name}} or {{table_name}} {{filter_value}}.")]
    ListRecordsFormat,
    #[error("ERROR: Invalid format. Expected {{table_name}} {{filter_value}}.")]
    FilterFormat,
    #[error("ERROR: Invalid format. Expected {{table_name}} {{sort_column}}.")]
    SortTableFormat,
}

/// Arguments of `add_record`: the raw values are passed to the store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRecord<'a> {
    pub table: &'a str,
    pub values: &'a str,
}

/// Arguments of `delete_record`. The index is not range-checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRecord<'a> {
    pub table: &'a str,
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecords<'a> {
    pub table: &'a str,
    pub filter: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortTable<'a> {
    pub table: &'a str,
    pub column: &'a str,
}

/// Splits off the first whitespace-delimited token, returning it and the rest.
fn split_first_token(body: &str) -> Option<(&str, &str)> {
    let body = body.trim_start();
    if body.is_empty() {
        return None;
    }
    match body.find(char::is_whitespace) {
        Some(end) => Some((&body[..end], &body[end..])),
        None => Some((body, "")),
    }
}

/// Parses `name [col type] [col type] ...` into a schema.
///
/// The part after the table name is cut on `[` and `]`; fragments holding
/// only whitespace are ignored, every other fragment must be exactly
/// `<column name> <type keyword>`.
pub fn parse_create_table(body: &str) -> Result<Schema, ParseError> {
    if body.is_empty() {
        return Err(ParseError::NoData);
    }
    let (name, rest) = split_first_token(body).ok_or(ParseError::NoTableName)?;
    if name.len() >= MAX_TABLE_NAME_LENGTH {
        return Err(ParseError::TableNameTooLong);
    }

    let mut columns = Vec::new();
    for fragment in rest.split(['[', ']']) {
        if fragment.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = fragment.split_whitespace().collect();
        let [col_name, keyword] = tokens[..] else {
            return Err(ParseError::InvalidColumnFormat(fragment.trim().to_string()));
        };
        if col_name.len() >= MAX_COLUMN_NAME_LENGTH {
            return Err(ParseError::ColumnNameTooLong(col_name.to_string()));
        }
        let col_type =
            convert_type(keyword).ok_or_else(|| ParseError::InvalidColumnType(keyword.to_string()))?;
        if columns.len() == MAX_COLUMNS {
            return Err(ParseError::TooManyColumns);
        }
        columns.push(ColumnSchema::new(col_name, col_type));
    }

    if columns.is_empty() {
        return Err(ParseError::NoColumns);
    }
    Ok(Schema::new(name, columns))
}

/// `delete_table` takes the whole (trimmed) body as the table name.
pub fn parse_delete_table(body: &str) -> &str {
    body.trim()
}

/// Parses `name values...`; the values run to the end of the first line.
pub fn parse_add_record(body: &str) -> Result<AddRecord<'_>, ParseError> {
    let (table, rest) = split_first_token(body).ok_or(ParseError::AddRecordFormat)?;
    let rest = rest.trim_start();
    let values = rest.split(['\n', '\r']).next().unwrap_or_default();
    if values.is_empty() {
        return Err(ParseError::AddRecordFormat);
    }
    Ok(AddRecord { table, values })
}

pub fn parse_delete_record(body: &str) -> Result<DeleteRecord<'_>, ParseError> {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    let [table, index] = tokens[..] else {
        return Err(ParseError::DeleteRecordFormat);
    };
    let index = index
        .parse::<i64>()
        .map_err(|_| ParseError::DeleteRecordFormat)?;
    Ok(DeleteRecord { table, index })
}

pub fn parse_list_records(body: &str) -> Result<ListRecords<'_>, ParseError> {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    match tokens[..] {
        [] => Err(ParseError::ListRecordsFormat),
        [table] => Ok(ListRecords {
            table,
            filter: None,
        }),
        [table, filter] => Ok(ListRecords {
            table,
            filter: Some(filter),
        }),
        _ => Err(ParseError::FilterFormat),
    }
}

pub fn parse_sort_table(body: &str) -> Result<SortTable<'_>, ParseError> {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    let [table, column] = tokens[..] else {
        return Err(ParseError::SortTableFormat);
    };
    Ok(SortTable { table, column })
}
