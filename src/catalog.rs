use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::storage::heap_file::HeapFile;
use crate::storage::heap_table::HeapTable;
use crate::storage::schema::Column;
use crate::types::error::{DbError, Result};
use crate::types::row::{row_of, Row};
use crate::types::value::{DataType, Value};

pub const TABLES: &str = "_tables";
pub const COLUMNS: &str = "_columns";
pub const INDICES: &str = "_indices";

/// True for the three self-describing schema tables.
pub fn is_system_table(name: &str) -> bool {
    name == TABLES || name == COLUMNS || name == INDICES
}

fn tables_schema() -> Vec<Column> {
    vec![Column::new("table_name", DataType::Text)]
}

fn columns_schema() -> Vec<Column> {
    vec![
        Column::new("table_name", DataType::Text),
        Column::new("column_name", DataType::Text),
        Column::new("data_type", DataType::Text),
    ]
}

fn indices_schema() -> Vec<Column> {
    vec![
        Column::new("table_name", DataType::Text),
        Column::new("index_name", DataType::Text),
        Column::new("seq_in_index", DataType::Int),
        Column::new("column_name", DataType::Text),
        Column::new("index_type", DataType::Text),
        Column::new("is_unique", DataType::Boolean),
    ]
}

/// An index definition plus the lifecycle of its backing file. Entry
/// maintenance lives behind the same create/drop contract as a heap file.
pub struct HeapIndex {
    table_name: String,
    index_name: String,
    index_type: String,
    is_unique: bool,
    columns: Vec<String>,
    file: HeapFile,
}

impl HeapIndex {
    fn new(
        dir: &Path,
        table_name: &str,
        index_name: &str,
        index_type: &str,
        is_unique: bool,
        columns: Vec<String>,
    ) -> Self {
        HeapIndex {
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
            index_type: index_type.to_string(),
            is_unique,
            columns,
            file: HeapFile::new(dir, index_name),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index_type(&self) -> &str {
        &self.index_type
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    /// Indexed columns, in key order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn create(&mut self) -> Result<()> {
        self.file.create()
    }

    pub fn drop_index(&mut self) -> Result<()> {
        self.file.drop_file()
    }
}

/// The system catalog: the three schema-table singletons, an open-on-demand
/// cache of user tables, and the index objects. All DDL goes through here.
pub struct Catalog {
    dir: PathBuf,
    tables: HeapTable,
    columns: HeapTable,
    indices: HeapTable,
    table_cache: HashMap<String, HeapTable>,
    index_cache: HashMap<(String, String), HeapIndex>,
}

impl Catalog {
    /// Open the catalog under `dir`, creating it on first use. On a fresh
    /// environment the schema tables register themselves in `_tables` and
    /// `_columns`, so the catalog describes itself.
    pub fn new(dir: &Path) -> Result<Self> {
        let mut catalog = Catalog {
            dir: dir.to_path_buf(),
            tables: HeapTable::new(dir, TABLES, tables_schema()),
            columns: HeapTable::new(dir, COLUMNS, columns_schema()),
            indices: HeapTable::new(dir, INDICES, indices_schema()),
            table_cache: HashMap::new(),
            index_cache: HashMap::new(),
        };
        catalog.tables.create_if_not_exists()?;
        catalog.columns.create_if_not_exists()?;
        catalog.indices.create_if_not_exists()?;
        if catalog.tables.select()?.is_empty() {
            catalog.bootstrap()?;
        }
        Ok(catalog)
    }

    fn bootstrap(&mut self) -> Result<()> {
        for name in [TABLES, COLUMNS, INDICES] {
            self.tables
                .insert(&row_of([("table_name", Value::from(name))]))?;
        }
        for (table, schema) in [
            (TABLES, tables_schema()),
            (COLUMNS, columns_schema()),
            (INDICES, indices_schema()),
        ] {
            for column in schema {
                self.columns.insert(&row_of([
                    ("table_name", Value::from(table)),
                    ("column_name", Value::from(column.name)),
                    ("data_type", Value::from(column.data_type.as_str())),
                ]))?;
            }
        }
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tables_mut(&mut self) -> &mut HeapTable {
        &mut self.tables
    }

    pub fn columns_mut(&mut self) -> &mut HeapTable {
        &mut self.columns
    }

    pub fn indices_mut(&mut self) -> &mut HeapTable {
        &mut self.indices
    }

    /// The relation behind `name`: a schema-table singleton, or a user
    /// table constructed from `_columns` and cached for the process
    /// lifetime.
    pub fn get_table(&mut self, name: &str) -> Result<&mut HeapTable> {
        match name {
            TABLES => return Ok(&mut self.tables),
            COLUMNS => return Ok(&mut self.columns),
            INDICES => return Ok(&mut self.indices),
            _ => {}
        }
        if !self.table_cache.contains_key(name) {
            let (names, types) = self.get_columns(name)?;
            let columns = names
                .into_iter()
                .zip(types)
                .map(|(n, t)| Column::new(n, t))
                .collect();
            let table = HeapTable::new(&self.dir, name, columns);
            self.table_cache.insert(name.to_string(), table);
        }
        self.table_cache
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound {
                name: name.to_string(),
            })
    }

    /// Column names and attributes of `name`, in declaration order.
    pub fn get_columns(&mut self, name: &str) -> Result<(Vec<String>, Vec<DataType>)> {
        let filter = row_of([("table_name", Value::from(name))]);
        let handles = self.columns.select_where(&filter)?;
        if handles.is_empty() {
            return Err(DbError::TableNotFound {
                name: name.to_string(),
            });
        }
        let mut names = Vec::new();
        let mut types = Vec::new();
        for handle in handles {
            let row = self.columns.project(handle)?;
            names.push(text_field(&row, "column_name")?);
            types.push(DataType::parse(&text_field(&row, "data_type")?)?);
        }
        Ok((names, types))
    }

    /// True when `name` has a row in `_tables`.
    pub fn table_exists(&mut self, name: &str) -> Result<bool> {
        let filter = row_of([("table_name", Value::from(name))]);
        Ok(!self.tables.select_where(&filter)?.is_empty())
    }

    /// Names of every index defined on `table`, without duplicates, in
    /// file order.
    pub fn get_index_names(&mut self, table: &str) -> Result<Vec<String>> {
        let filter = row_of([("table_name", Value::from(table))]);
        let mut names: Vec<String> = Vec::new();
        for handle in self.indices.select_where(&filter)? {
            let row = self.indices.project(handle)?;
            let name = text_field(&row, "index_name")?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// The index object for `(table, index_name)`, built from the
    /// `_indices` rows on first access and cached.
    pub fn get_index(&mut self, table: &str, index_name: &str) -> Result<&mut HeapIndex> {
        let key = (table.to_string(), index_name.to_string());
        if !self.index_cache.contains_key(&key) {
            let filter = row_of([
                ("table_name", Value::from(table)),
                ("index_name", Value::from(index_name)),
            ]);
            let handles = self.indices.select_where(&filter)?;
            if handles.is_empty() {
                return Err(DbError::Relation {
                    details: format!("no index '{}' on table '{}'", index_name, table),
                });
            }
            let mut entries = Vec::new();
            let mut index_type = String::from("BTREE");
            let mut is_unique = false;
            for handle in handles {
                let row = self.indices.project(handle)?;
                index_type = text_field(&row, "index_type")?;
                is_unique = bool_field(&row, "is_unique")?;
                entries.push((
                    int_field(&row, "seq_in_index")?,
                    text_field(&row, "column_name")?,
                ));
            }
            entries.sort_by_key(|(seq, _)| *seq);
            let columns = entries.into_iter().map(|(_, column)| column).collect();
            let index = HeapIndex::new(&self.dir, table, index_name, &index_type, is_unique, columns);
            self.index_cache.insert(key.clone(), index);
        }
        self.index_cache
            .get_mut(&key)
            .ok_or_else(|| DbError::Relation {
                details: format!("no index '{}' on table '{}'", index_name, table),
            })
    }

    /// Forget the cached table object, after its file has been dropped.
    pub fn evict_table(&mut self, name: &str) {
        self.table_cache.remove(name);
    }

    /// Forget the cached index object, after its file has been dropped.
    pub fn evict_index(&mut self, table: &str, index_name: &str) {
        self.index_cache
            .remove(&(table.to_string(), index_name.to_string()));
    }
}

fn text_field(row: &Row, name: &str) -> Result<String> {
    match row.get(name) {
        Some(Value::Text(s)) => Ok(s.clone()),
        _ => Err(missing_field(name)),
    }
}

fn int_field(row: &Row, name: &str) -> Result<i32> {
    match row.get(name) {
        Some(Value::Int(n)) => Ok(*n),
        _ => Err(missing_field(name)),
    }
}

fn bool_field(row: &Row, name: &str) -> Result<bool> {
    match row.get(name) {
        Some(Value::Boolean(b)) => Ok(*b),
        _ => Err(missing_field(name)),
    }
}

fn missing_field(name: &str) -> DbError {
    DbError::Relation {
        details: format!("catalog row is missing field '{}'", name),
    }
}
