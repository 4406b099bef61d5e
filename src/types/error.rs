use thiserror::Error;

use crate::types::BlockId;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file '{name}' already exists")]
    FileExists { name: String },

    #[error("file '{name}' not found")]
    FileNotFound { name: String },

    #[error("file '{name}' is not open")]
    FileClosed { name: String },

    #[error("no room in block {block_id} for {needed} more bytes")]
    NoRoom { block_id: BlockId, needed: usize },

    #[error("unsupported data type '{name}'")]
    UnsupportedType { name: String },

    #[error("table '{name}' does not exist")]
    TableNotFound { name: String },

    #[error("table '{table}' does not have column '{name}'")]
    ColumnNotFound { table: String, name: String },

    #[error("{details}")]
    Relation { details: String },

    #[error("parse error: {details}")]
    Parse { details: String },
}

pub type Result<T> = std::result::Result<T, DbError>;
