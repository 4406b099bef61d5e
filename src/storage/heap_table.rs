use std::path::Path;

use crate::storage::heap_file::HeapFile;
use crate::storage::schema::Column;
use crate::storage::tuple;
use crate::types::error::{DbError, Result};
use crate::types::row::Row;
use crate::types::Handle;

/// A relation stored as marshalled tuples in one heap file. The schema is
/// fixed at construction time.
pub struct HeapTable {
    name: String,
    columns: Vec<Column>,
    file: HeapFile,
}

impl HeapTable {
    pub fn new(dir: &Path, name: &str, columns: Vec<Column>) -> Self {
        HeapTable {
            name: name.to_string(),
            columns,
            file: HeapFile::new(dir, name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn create(&mut self) -> Result<()> {
        self.file.create()
    }

    /// Create the backing file, or just open it when it already exists.
    pub fn create_if_not_exists(&mut self) -> Result<()> {
        match self.open() {
            Ok(()) => Ok(()),
            Err(DbError::FileNotFound { .. }) => self.file.create(),
            Err(e) => Err(e),
        }
    }

    /// Delete the backing file. The table must not be used afterwards.
    pub fn drop_table(&mut self) -> Result<()> {
        self.file.drop_file()
    }

    pub fn open(&mut self) -> Result<()> {
        self.file.open()
    }

    pub fn close(&mut self) -> Result<()> {
        self.file.close()
    }

    /// Insert a row. Every schema column must be present; surplus keys are
    /// ignored. Returns the handle of the stored tuple.
    pub fn insert(&mut self, row: &Row) -> Result<Handle> {
        self.open()?;
        let full = self.validate(row)?;
        self.append(&full)
    }

    /// Tombstone the tuple at `handle`.
    pub fn del(&mut self, handle: Handle) -> Result<()> {
        self.open()?;
        let (block_id, record_id) = handle;
        let mut block = self.file.get(block_id)?;
        block.del(record_id)?;
        self.file.put(&block)
    }

    /// Handles of every live tuple, in block order.
    pub fn select(&mut self) -> Result<Vec<Handle>> {
        self.open()?;
        let mut handles = Vec::new();
        for block_id in self.file.block_ids() {
            let block = self.file.get(block_id)?;
            for record_id in block.ids() {
                handles.push((block_id, record_id));
            }
        }
        Ok(handles)
    }

    /// Handles of tuples whose row matches every column/value pair in
    /// `predicate`.
    pub fn select_where(&mut self, predicate: &Row) -> Result<Vec<Handle>> {
        self.open()?;
        let mut handles = Vec::new();
        for block_id in self.file.block_ids() {
            let block = self.file.get(block_id)?;
            for record_id in block.ids() {
                let data = block.get(record_id).ok_or_else(|| DbError::Relation {
                    details: format!(
                        "no record {} in block {} of table '{}'",
                        record_id, block_id, self.name
                    ),
                })?;
                let row = tuple::unmarshal(&self.columns, &data)?;
                if predicate.iter().all(|(name, value)| row.get(name) == Some(value)) {
                    handles.push((block_id, record_id));
                }
            }
        }
        Ok(handles)
    }

    /// The full row stored at `handle`.
    pub fn project(&mut self, handle: Handle) -> Result<Row> {
        self.open()?;
        let (block_id, record_id) = handle;
        let block = self.file.get(block_id)?;
        let data = block.get(record_id).ok_or_else(|| DbError::Relation {
            details: format!(
                "no record {} in block {} of table '{}'",
                record_id, block_id, self.name
            ),
        })?;
        tuple::unmarshal(&self.columns, &data)
    }

    /// The named subset of the row at `handle`. An empty list selects all
    /// columns.
    pub fn project_columns(&mut self, handle: Handle, column_names: &[String]) -> Result<Row> {
        let mut row = self.project(handle)?;
        if column_names.is_empty() {
            return Ok(row);
        }
        let mut projected = Row::new();
        for name in column_names {
            let value = row.remove(name).ok_or_else(|| DbError::ColumnNotFound {
                table: self.name.clone(),
                name: name.clone(),
            })?;
            projected.insert(name.clone(), value);
        }
        Ok(projected)
    }

    /// Copy out exactly the schema columns of `row`, failing when one is
    /// absent.
    fn validate(&self, row: &Row) -> Result<Row> {
        let mut full = Row::new();
        for column in &self.columns {
            let value = row.get(&column.name).ok_or_else(|| DbError::Relation {
                details: format!(
                    "insert into '{}' is missing column '{}'",
                    self.name, column.name
                ),
            })?;
            full.insert(column.name.clone(), value.clone());
        }
        Ok(full)
    }

    /// Marshal and store a validated row, spilling to a fresh block when
    /// the last one is full.
    fn append(&mut self, row: &Row) -> Result<Handle> {
        let data = tuple::marshal(&self.columns, row)?;
        let last = self.file.last_block_id();
        let mut block = self.file.get(last)?;
        let record_id = match block.add(&data) {
            Ok(id) => id,
            Err(DbError::NoRoom { .. }) => {
                block = self.file.get_new()?;
                block.add(&data)?
            }
            Err(e) => return Err(e),
        };
        let handle = (block.block_id(), record_id);
        self.file.put(&block)?;
        Ok(handle)
    }
}
