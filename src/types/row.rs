use std::collections::HashMap;

use crate::types::value::Value;

/// An in-memory row: column name to value. Rows handed out by the storage
/// layer are fresh, caller-owned copies.
pub type Row = HashMap<String, Value>;

/// Build a row from (column, value) pairs.
pub fn row_of<const N: usize>(pairs: [(&str, Value); N]) -> Row {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
