// handlers.rs
//
// One handler per verb. Each one checks the session, parses its body, runs a
// single store operation for the session's user and formats the reply.

use crate::command::{
    parse_add_record, parse_create_table, parse_delete_record, parse_delete_table,
    parse_list_records, parse_sort_table, ListRecords,
};
use crate::database::{Database, DatabaseInterface};
use crate::error::StoreError;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Replies are cut to fit a chunk of this many bytes, terminator included.
pub const MAX_CHUNK_SIZE: usize = 1024;

pub const NOT_SIGNED_IN: &str = "ERROR: You must be signed in to perform this action";

pub type SharedDatabase = Arc<Mutex<Database>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    CreateTable,
    DeleteTable,
    AddRecord,
    DeleteRecord,
    ListTables,
    ListRecords,
    SortTable,
}

impl Verb {
    pub const ALL: [Verb; 7] = [
        Verb::CreateTable,
        Verb::DeleteTable,
        Verb::AddRecord,
        Verb::DeleteRecord,
        Verb::ListTables,
        Verb::ListRecords,
        Verb::SortTable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::CreateTable => "create_table",
            Verb::DeleteTable => "delete_table",
            Verb::AddRecord => "add_record",
            Verb::DeleteRecord => "delete_record",
            Verb::ListTables => "list_tables",
            Verb::ListRecords => "list_records",
            Verb::SortTable => "sort_table",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("ERROR: Unknown command '{}'", s))
    }
}

/// A reply to one command.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub success: bool,
    pub message: String,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Response {
            success: true,
            message: truncate_to_chunk(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response {
            success: false,
            message: truncate_to_chunk(message.into()),
        }
    }
}

/// Truncates `message` to `MAX_CHUNK_SIZE - 1` bytes on a char boundary.
pub fn truncate_to_chunk(mut message: String) -> String {
    let limit = MAX_CHUNK_SIZE - 1;
    if message.len() > limit {
        let mut end = limit;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

/// Runs table commands against a shared store.
#[derive(Clone)]
pub struct TableHandler {
    db: SharedDatabase,
    data_file: Option<PathBuf>,
}

impl TableHandler {
    pub fn new(db: SharedDatabase) -> Self {
        TableHandler { db, data_file: None }
    }

    /// Rewrite `path` with a snapshot of the store after every successful change.
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    pub fn database(&self) -> &SharedDatabase {
        &self.db
    }

    pub fn handle(&self, verb: Verb, session: Option<&Session>, body: &str) -> Response {
        match verb {
            Verb::CreateTable => self.create_table(session, body),
            Verb::DeleteTable => self.delete_table(session, body),
            Verb::AddRecord => self.add_record(session, body),
            Verb::DeleteRecord => self.delete_record(session, body),
            Verb::ListTables => self.list_tables(session),
            Verb::ListRecords => self.list_records(session, body),
            Verb::SortTable => self.sort_table(session, body),
        }
    }

    fn read<T>(&self, op: impl FnOnce(&Database) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let db = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        op(&db)
    }

    /// Runs `op` under the lock and, when it succeeds, writes the snapshot
    /// before releasing it.
    fn write<T>(
        &self,
        op: impl FnOnce(&mut Database) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut db = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        let out = op(&mut db)?;
        if let Some(path) = &self.data_file {
            if let Err(err) = db.save_to_file(path) {
                warn!(path = %path.display(), error = %err, "failed to write snapshot");
            }
        }
        Ok(out)
    }

    /// Registers a user; the registry is saved with the tables.
    pub fn sign_up(&self, username: &str, password: &str) -> Result<u64, StoreError> {
        self.write(|db| Ok(db.users.sign_up(username, password)?))
    }

    /// Checks credentials and returns the user id they belong to.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<u64, StoreError> {
        self.read(|db| Ok(db.users.verify(username, password)?))
    }

    pub fn create_table(&self, session: Option<&Session>, body: &str) -> Response {
        let Some(session) = session else {
            return Response::error(NOT_SIGNED_IN);
        };
        let schema = match parse_create_table(body) {
            Ok(schema) => schema,
            Err(err) => return Response::error(err.to_string()),
        };
        match self.write(|db| db.create_table(session.user_id, schema)) {
            Ok(()) => Response::ok("Table created successfully"),
            Err(err) => {
                debug!(user_id = session.user_id, error = %err, "create_table failed");
                Response::error("ERROR: Failed to create table")
            }
        }
    }

    pub fn delete_table(&self, session: Option<&Session>, body: &str) -> Response {
        let Some(session) = session else {
            return Response::error(NOT_SIGNED_IN);
        };
        let table = parse_delete_table(body);
        match self.write(|db| db.drop_table(session.user_id, table)) {
            Ok(_) => Response::ok("Table deleted successfully"),
            Err(err) => {
                debug!(user_id = session.user_id, table, error = %err, "delete_table failed");
                Response::error("ERROR: Failed to delete table")
            }
        }
    }

    pub fn add_record(&self, session: Option<&Session>, body: &str) -> Response {
        let Some(session) = session else {
            return Response::error(NOT_SIGNED_IN);
        };
        let args = match parse_add_record(body) {
            Ok(args) => args,
            Err(err) => return Response::error(err.to_string()),
        };
        match self.write(|db| db.insert(session.user_id, args.table, args.values)) {
            Ok(_) => Response::ok(format!(
                "Record added successfully to table '{}'",
                args.table
            )),
            Err(err) => {
                debug!(user_id = session.user_id, table = args.table, error = %err, "add_record failed");
                Response::error(format!(
                    "ERROR: Failed to add record to table '{}'",
                    args.table
                ))
            }
        }
    }

    pub fn delete_record(&self, session: Option<&Session>, body: &str) -> Response {
        let Some(session) = session else {
            return Response::error(NOT_SIGNED_IN);
        };
        let args = match parse_delete_record(body) {
            Ok(args) => args,
            Err(err) => return Response::error(err.to_string()),
        };
        let result = if args.index > 0 {
            self.write(|db| db.delete_record(session.user_id, args.table, args.index))
        } else {
            Err(StoreError::RowOutOfRange {
                index: args.index,
                len: 0,
            })
        };
        match result {
            Ok(()) => Response::ok(format!(
                "Record deleted successfully from table '{}'",
                args.table
            )),
            Err(err) => {
                debug!(user_id = session.user_id, table = args.table, error = %err, "delete_record failed");
                Response::error(format!(
                    "ERROR: Failed to delete record from table '{}'",
                    args.table
                ))
            }
        }
    }

    pub fn list_tables(&self, session: Option<&Session>) -> Response {
        let Some(session) = session else {
            return Response::error(NOT_SIGNED_IN);
        };
        match self.read(|db| Ok(db.list_tables(session.user_id))) {
            Ok(names) => Response::ok(format!("Tables: {}", names.join(", "))),
            Err(err) => {
                debug!(user_id = session.user_id, error = %err, "list_tables failed");
                Response::error("ERROR: Failed to list tables.")
            }
        }
    }

    pub fn list_records(&self, session: Option<&Session>, body: &str) -> Response {
        let Some(session) = session else {
            return Response::error(NOT_SIGNED_IN);
        };
        let ListRecords { table, filter } = match parse_list_records(body) {
            Ok(args) => args,
            Err(err) => return Response::error(err.to_string()),
        };
        match self.read(|db| db.list_records(session.user_id, table, filter)) {
            Ok(rows) => {
                let rows = rows.join("\n");
                match filter {
                    Some(filter) => Response::ok(format!(
                        "Filtered records from table '{}' containing '{}':\n{}",
                        table, filter, rows
                    )),
                    None => Response::ok(format!("Records from table '{}':\n{}", table, rows)),
                }
            }
            Err(err) => {
                debug!(user_id = session.user_id, table, error = %err, "list_records failed");
                Response::error(format!(
                    "ERROR: Failed to list records from table '{}'.",
                    table
                ))
            }
        }
    }

    pub fn sort_table(&self, session: Option<&Session>, body: &str) -> Response {
        let Some(session) = session else {
            return Response::error(NOT_SIGNED_IN);
        };
        let args = match parse_sort_table(body) {
            Ok(args) => args,
            Err(err) => return Response::error(err.to_string()),
        };
        match self.write(|db| db.sort_table(session.user_id, args.table, args.column)) {
            Ok(rows) => Response::ok(format!(
                "Table '{}' sorted by '{}':\n{}",
                args.table,
                args.column,
                rows.join("\n")
            )),
            Err(err) => {
                debug!(user_id = session.user_id, table = args.table, error = %err, "sort_table failed");
                Response::error(format!(
                    "ERROR: Failed to sort table '{}' by '{}'.",
                    args.table, args.column
                ))
            }
        }
    }
}
