mod create;
mod drop;
mod show;

use std::fmt;

use crate::catalog::Catalog;
use crate::sql::ast::Statement;
use crate::types::error::{DbError, Result};
use crate::types::row::Row;
use crate::types::value::{DataType, Value};

/// The outcome of one statement: optional result columns and rows, plus a
/// short human-readable message.
pub struct QueryResult {
    pub column_names: Option<Vec<String>>,
    pub column_attributes: Option<Vec<DataType>>,
    pub rows: Option<Vec<Row>>,
    pub message: String,
}

impl QueryResult {
    pub fn message(message: impl Into<String>) -> Self {
        QueryResult {
            column_names: None,
            column_attributes: None,
            rows: None,
            message: message.into(),
        }
    }

    pub fn with_rows(
        column_names: Vec<String>,
        column_attributes: Vec<DataType>,
        rows: Vec<Row>,
        message: impl Into<String>,
    ) -> Self {
        QueryResult {
            column_names: Some(column_names),
            column_attributes: Some(column_attributes),
            rows: Some(rows),
            message: message.into(),
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(names), Some(rows)) = (&self.column_names, &self.rows) {
            for name in names {
                write!(f, "{} ", name)?;
            }
            writeln!(f)?;
            write!(f, "+")?;
            for _ in names {
                write!(f, "----------+")?;
            }
            writeln!(f)?;
            for row in rows {
                for name in names {
                    match row.get(name) {
                        Some(Value::Text(s)) => write!(f, "\"{}\" ", s)?,
                        Some(value) => write!(f, "{} ", value)?,
                        None => write!(f, "? ")?,
                    }
                }
                writeln!(f)?;
            }
        }
        write!(f, "{}", self.message)
    }
}

/// Execute one parsed statement against the catalog.
pub fn execute(catalog: &mut Catalog, statement: &Statement) -> Result<QueryResult> {
    let result = match statement {
        Statement::CreateTable(create) => create::create_table(catalog, create),
        Statement::CreateIndex(create) => create::create_index(catalog, create),
        Statement::DropTable(drop) => drop::drop_table(catalog, drop),
        Statement::DropIndex(drop) => drop::drop_index(catalog, drop),
        Statement::ShowTables => show::show_tables(catalog),
        Statement::ShowColumns { table } => show::show_columns(catalog, table),
        Statement::ShowIndex { table } => show::show_index(catalog, table),
    };
    result.map_err(wrap_substrate)
}

/// Substrate failures crossing the executor boundary read as relation
/// errors.
fn wrap_substrate(err: DbError) -> DbError {
    match err {
        DbError::Io(_)
        | DbError::FileExists { .. }
        | DbError::FileNotFound { .. }
        | DbError::FileClosed { .. } => DbError::Relation {
            details: err.to_string(),
        },
        other => other,
    }
}
