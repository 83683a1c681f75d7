use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use tracing::debug;
// database.rs

/// Operations of the table store. Every call is scoped to one owner; a table
/// owned by someone else is indistinguishable from a missing one.
pub trait DatabaseInterface {
    fn create_table(&mut self, owner: u64, schema: Schema) -> Result<(), StoreError>;
    fn drop_table(&mut self, owner: u64, table_name: &str) -> Result<Table, StoreError>;
    /// Appends a raw record and returns its 1-based index.
    fn insert(&mut self, owner: u64, table_name: &str, raw: &str) -> Result<usize, StoreError>;
    /// Deletes the row at the 1-based `index`.
    fn delete_record(&mut self, owner: u64, table_name: &str, index: i64)
    -> Result<(), StoreError>;
    fn list_tables(&self, owner: u64) -> Vec<String>;
    fn list_records(
        &self,
        owner: u64,
        table_name: &str,
        filter: Option<&str>,
    ) -> Result<Vec<String>, StoreError>;
    fn sort_table(
        &mut self,
        owner: u64,
        table_name: &str,
        column: &str,
    ) -> Result<Vec<String>, StoreError>;
}

use crate::error::StoreError;
use crate::schema::Schema;
use crate::session::UserRegistry;
use crate::table::{Table, TableInterface};
use std::collections::{BTreeMap, HashMap};

/// Behaviour switches of the store that are not part of its persisted state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Reject records whose field count or field types disagree with the schema.
    pub strict_records: bool,
}

/// The table store: owner id -> table name -> table, plus the users that
/// own them.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Database {
    pub namespaces: HashMap<u64, BTreeMap<String, Table>>,
    #[serde(default)]
    pub users: UserRegistry,
    #[serde(skip)]
    config: StoreConfig,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Database {
            namespaces: HashMap::new(),
            users: UserRegistry::default(),
            config,
        }
    }

    pub fn set_config(&mut self, config: StoreConfig) {
        self.config = config;
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Returns the table `table_name` of `owner`, if any.
    pub fn get_table(&self, owner: u64, table_name: &str) -> Option<&Table> {
        self.namespaces.get(&owner)?.get(table_name)
    }

    fn get_table_mut(&mut self, owner: u64, table_name: &str) -> Result<&mut Table, StoreError> {
        self.namespaces
            .get_mut(&owner)
            .and_then(|tables| tables.get_mut(table_name))
            .ok_or_else(|| StoreError::TableNotFound(table_name.to_string()))
    }

    /// Total number of tables across all owners.
    pub fn table_count(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    /// Save the database to a file as JSON
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Parent directory does not exist",
                )));
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        debug!(path = %path.display(), tables = self.table_count(), "saved snapshot");
        Ok(())
    }

    /// Load the database from a file (JSON)
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let mut file = File::open(path.as_ref())?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let mut db: Database = serde_json::from_str(&contents)?;
        // snapshots written without a user registry still own their tables
        if let Some(max_owner) = db.namespaces.keys().max().copied() {
            db.users.reserve_through(max_owner);
        }
        Ok(db)
    }
}

impl DatabaseInterface for Database {
    fn create_table(&mut self, owner: u64, schema: Schema) -> Result<(), StoreError> {
        if schema.columns.is_empty() {
            return Err(StoreError::EmptySchema(schema.name));
        }
        let tables = self.namespaces.entry(owner).or_default();
        if tables.contains_key(&schema.name) {
            return Err(StoreError::TableAlreadyExists(schema.name));
        }
        debug!(owner, table = %schema.name, columns = schema.columns.len(), "created table");
        tables.insert(schema.name.clone(), Table::new(owner, schema));
        Ok(())
    }

    fn drop_table(&mut self, owner: u64, table_name: &str) -> Result<Table, StoreError> {
        let table = self
            .namespaces
            .get_mut(&owner)
            .and_then(|tables| tables.remove(table_name))
            .ok_or_else(|| StoreError::TableNotFound(table_name.to_string()))?;
        debug!(owner, table = table_name, rows = table.rows.len(), "dropped table");
        Ok(table)
    }

    fn insert(&mut self, owner: u64, table_name: &str, raw: &str) -> Result<usize, StoreError> {
        let strict = self.config.strict_records;
        let index = self.get_table_mut(owner, table_name)?.add_row(raw, strict)?;
        debug!(owner, table = table_name, index, "inserted record");
        Ok(index)
    }

    fn delete_record(
        &mut self,
        owner: u64,
        table_name: &str,
        index: i64,
    ) -> Result<(), StoreError> {
        self.get_table_mut(owner, table_name)?.delete_row(index)?;
        debug!(owner, table = table_name, index, "deleted record");
        Ok(())
    }

    fn list_tables(&self, owner: u64) -> Vec<String> {
        self.namespaces
            .get(&owner)
            .map(|tables| tables.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn list_records(
        &self,
        owner: u64,
        table_name: &str,
        filter: Option<&str>,
    ) -> Result<Vec<String>, StoreError> {
        self.get_table(owner, table_name)
            .map(|table| table.select_rows(filter))
            .ok_or_else(|| StoreError::TableNotFound(table_name.to_string()))
    }

    fn sort_table(
        &mut self,
        owner: u64,
        table_name: &str,
        column: &str,
    ) -> Result<Vec<String>, StoreError> {
        let rows = self.get_table_mut(owner, table_name)?.sort_by_column(column)?;
        debug!(owner, table = table_name, column, "sorted table");
        Ok(rows)
    }
}
