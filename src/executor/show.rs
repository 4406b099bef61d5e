use crate::catalog::{self, is_system_table, Catalog};
use crate::executor::QueryResult;
use crate::types::error::{DbError, Result};
use crate::types::row::row_of;
use crate::types::value::Value;

/// SHOW TABLES: every `_tables` row except the schema tables themselves.
pub fn show_tables(catalog: &mut Catalog) -> Result<QueryResult> {
    let (names, attrs) = catalog.get_columns(catalog::TABLES)?;
    let tables = catalog.tables_mut();
    let mut rows = Vec::new();
    for handle in tables.select()? {
        let row = tables.project(handle)?;
        let system = matches!(row.get("table_name"), Some(Value::Text(name)) if is_system_table(name));
        if !system {
            rows.push(row);
        }
    }
    let message = format!("successfully returned {} rows", rows.len());
    Ok(QueryResult::with_rows(names, attrs, rows, message))
}

/// SHOW COLUMNS FROM t: the `_columns` rows for `t`, in declaration order.
pub fn show_columns(catalog: &mut Catalog, table_name: &str) -> Result<QueryResult> {
    let (names, attrs) = catalog.get_columns(catalog::COLUMNS)?;
    let filter = row_of([("table_name", Value::from(table_name))]);
    let columns = catalog.columns_mut();
    let mut rows = Vec::new();
    for handle in columns.select_where(&filter)? {
        rows.push(columns.project(handle)?);
    }
    let message = format!("successfully returned {} rows", rows.len());
    Ok(QueryResult::with_rows(names, attrs, rows, message))
}

/// SHOW INDEX FROM t: the `_indices` rows for `t`; the table must exist.
pub fn show_index(catalog: &mut Catalog, table_name: &str) -> Result<QueryResult> {
    if !catalog.table_exists(table_name)? {
        return Err(DbError::TableNotFound {
            name: table_name.to_string(),
        });
    }
    let (names, attrs) = catalog.get_columns(catalog::INDICES)?;
    let filter = row_of([("table_name", Value::from(table_name))]);
    let indices = catalog.indices_mut();
    let mut rows = Vec::new();
    for handle in indices.select_where(&filter)? {
        rows.push(indices.project(handle)?);
    }
    let message = format!("successfully returned {} rows", rows.len());
    Ok(QueryResult::with_rows(names, attrs, rows, message))
}
