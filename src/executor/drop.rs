use crate::catalog::{is_system_table, Catalog};
use crate::executor::QueryResult;
use crate::sql::ast::{DropIndex, DropTable};
use crate::types::error::{DbError, Result};
use crate::types::row::row_of;
use crate::types::value::Value;

/// DROP TABLE: refuse for schema tables and unknown tables; otherwise drop
/// the table's indices, its `_columns` rows, its backing file, and finally
/// its `_tables` row.
pub fn drop_table(catalog: &mut Catalog, statement: &DropTable) -> Result<QueryResult> {
    let table_name = statement.table.as_str();

    if is_system_table(table_name) {
        return Err(DbError::Relation {
            details: format!("cannot drop schema table '{}'", table_name),
        });
    }
    if !catalog.table_exists(table_name)? {
        return Err(DbError::TableNotFound {
            name: table_name.to_string(),
        });
    }

    // resolve the table object while its _columns rows still exist; an
    // uncached table cannot be reconstructed once they are gone
    catalog.get_table(table_name)?;

    for index_name in catalog.get_index_names(table_name)? {
        drop_one_index(catalog, table_name, &index_name)?;
    }

    let filter = row_of([("table_name", Value::from(table_name))]);

    let column_handles = catalog.columns_mut().select_where(&filter)?;
    for handle in column_handles {
        catalog.columns_mut().del(handle)?;
    }

    catalog.get_table(table_name)?.drop_table()?;
    catalog.evict_table(table_name);

    let table_handles = catalog.tables_mut().select_where(&filter)?;
    if let Some(handle) = table_handles.first() {
        catalog.tables_mut().del(*handle)?;
    }

    Ok(QueryResult::message(format!("dropped {}", table_name)))
}

/// DROP INDEX: drop the backing file, then the `_indices` rows.
pub fn drop_index(catalog: &mut Catalog, statement: &DropIndex) -> Result<QueryResult> {
    drop_one_index(catalog, &statement.table, &statement.index)?;
    Ok(QueryResult::message(format!(
        "dropped index {}",
        statement.index
    )))
}

fn drop_one_index(catalog: &mut Catalog, table_name: &str, index_name: &str) -> Result<()> {
    catalog.get_index(table_name, index_name)?.drop_index()?;
    let filter = row_of([
        ("table_name", Value::from(table_name)),
        ("index_name", Value::from(index_name)),
    ]);
    for handle in catalog.indices_mut().select_where(&filter)? {
        catalog.indices_mut().del(handle)?;
    }
    catalog.evict_index(table_name, index_name);
    Ok(())
}
