use crate::catalog::Catalog;
use crate::executor::QueryResult;
use crate::sql::ast::{CreateIndex, CreateTable};
use crate::types::error::{DbError, Result};
use crate::types::row::row_of;
use crate::types::value::Value;

/// CREATE TABLE: register the table and its columns in the catalog, then
/// create the backing file. Any failure undoes the catalog rows in reverse
/// order; undo errors are swallowed so the root cause surfaces.
pub fn create_table(catalog: &mut Catalog, statement: &CreateTable) -> Result<QueryResult> {
    let table_name = statement.table.as_str();

    if statement.if_not_exists && catalog.table_exists(table_name)? {
        return Ok(QueryResult::message(format!(
            "{} already exists",
            table_name
        )));
    }

    let table_handle = catalog
        .tables_mut()
        .insert(&row_of([("table_name", Value::from(table_name))]))?;

    let mut column_handles = Vec::new();
    let outcome: Result<()> = (|| {
        for column in &statement.columns {
            let row = row_of([
                ("table_name", Value::from(table_name)),
                ("column_name", Value::from(column.name.as_str())),
                ("data_type", Value::from(column.data_type.as_str())),
            ]);
            column_handles.push(catalog.columns_mut().insert(&row)?);
        }
        let table = catalog.get_table(table_name)?;
        if statement.if_not_exists {
            table.create_if_not_exists()
        } else {
            table.create()
        }
    })();

    if let Err(err) = outcome {
        for handle in column_handles.iter().rev() {
            let _ = catalog.columns_mut().del(*handle);
        }
        let _ = catalog.tables_mut().del(table_handle);
        catalog.evict_table(table_name);
        return Err(err);
    }

    Ok(QueryResult::message(format!("created {}", table_name)))
}

/// CREATE INDEX: the table and every indexed column must exist; the index
/// rows go into `_indices` before the backing file is created. On failure
/// the file and rows are removed best-effort and the root cause surfaces.
pub fn create_index(catalog: &mut Catalog, statement: &CreateIndex) -> Result<QueryResult> {
    let table_name = statement.table.as_str();
    let index_name = statement.index.as_str();

    if !catalog.table_exists(table_name)? {
        return Err(DbError::TableNotFound {
            name: table_name.to_string(),
        });
    }
    // refuse duplicates up front; the rollback below must only ever remove
    // a file this statement created
    if catalog
        .get_index_names(table_name)?
        .iter()
        .any(|name| name == index_name)
    {
        return Err(DbError::Relation {
            details: format!(
                "index '{}' on table '{}' already exists",
                index_name, table_name
            ),
        });
    }
    let (column_names, _) = catalog.get_columns(table_name)?;
    for column in &statement.columns {
        if !column_names.contains(column) {
            return Err(DbError::ColumnNotFound {
                table: table_name.to_string(),
                name: column.clone(),
            });
        }
    }

    let is_unique = statement.index_type == "BTREE";
    let mut row_handles = Vec::new();
    let outcome: Result<()> = (|| {
        for (seq, column) in statement.columns.iter().enumerate() {
            let row = row_of([
                ("table_name", Value::from(table_name)),
                ("index_name", Value::from(index_name)),
                ("seq_in_index", Value::Int(seq as i32 + 1)),
                ("column_name", Value::from(column.as_str())),
                ("index_type", Value::from(statement.index_type.as_str())),
                ("is_unique", Value::Boolean(is_unique)),
            ]);
            row_handles.push(catalog.indices_mut().insert(&row)?);
        }
        catalog.get_index(table_name, index_name)?.create()
    })();

    if let Err(err) = outcome {
        if let Ok(index) = catalog.get_index(table_name, index_name) {
            let _ = index.drop_index();
        }
        for handle in row_handles.iter().rev() {
            let _ = catalog.indices_mut().del(*handle);
        }
        catalog.evict_index(table_name, index_name);
        return Err(err);
    }

    Ok(QueryResult::message(format!("created index {}", index_name)))
}
