use crate::storage::schema::Column;
use crate::types::error::{DbError, Result};
use crate::types::row::Row;
use crate::types::value::{DataType, Value};
use crate::types::BLOCK_SZ;

/// Marshal a validated row into its stored form: fields concatenated in
/// schema column order. INT is a 4-byte little-endian i32, TEXT a
/// little-endian u16 length followed by the raw bytes, BOOLEAN a single
/// 0/1 byte.
pub fn marshal(columns: &[Column], row: &Row) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for column in columns {
        let value = row.get(&column.name).ok_or_else(|| DbError::Relation {
            details: format!("row is missing column '{}'", column.name),
        })?;
        match (column.data_type, value) {
            (DataType::Int, Value::Int(n)) => bytes.extend_from_slice(&n.to_le_bytes()),
            (DataType::Text, Value::Text(s)) => {
                if s.len() > u16::MAX as usize {
                    return Err(DbError::Relation {
                        details: format!(
                            "value for column '{}' is {} bytes, longer than {}",
                            column.name,
                            s.len(),
                            u16::MAX
                        ),
                    });
                }
                bytes.extend_from_slice(&(s.len() as u16).to_le_bytes());
                bytes.extend_from_slice(s.as_bytes());
            }
            (DataType::Boolean, Value::Boolean(b)) => bytes.push(*b as u8),
            (expected, value) => {
                return Err(DbError::Relation {
                    details: format!(
                        "column '{}' holds {} but the row supplies {}",
                        column.name,
                        expected,
                        value.data_type()
                    ),
                });
            }
        }
    }
    if bytes.len() > BLOCK_SZ {
        return Err(DbError::Relation {
            details: format!("marshalled row is {} bytes, larger than a block", bytes.len()),
        });
    }
    Ok(bytes)
}

/// Rebuild a row from its stored form, walking the schema column order to
/// find each field's width.
pub fn unmarshal(columns: &[Column], bytes: &[u8]) -> Result<Row> {
    let mut row = Row::new();
    let mut offset = 0usize;
    for column in columns {
        let value = match column.data_type {
            DataType::Int => {
                if offset + 4 > bytes.len() {
                    return Err(truncated(column));
                }
                let n = i32::from_le_bytes([
                    bytes[offset],
                    bytes[offset + 1],
                    bytes[offset + 2],
                    bytes[offset + 3],
                ]);
                offset += 4;
                Value::Int(n)
            }
            DataType::Text => {
                if offset + 2 > bytes.len() {
                    return Err(truncated(column));
                }
                let len = u16::from_le_bytes([bytes[offset], bytes[offset + 1]]) as usize;
                offset += 2;
                if offset + len > bytes.len() {
                    return Err(truncated(column));
                }
                let s = String::from_utf8_lossy(&bytes[offset..offset + len]).into_owned();
                offset += len;
                Value::Text(s)
            }
            DataType::Boolean => {
                if offset >= bytes.len() {
                    return Err(truncated(column));
                }
                let b = bytes[offset];
                offset += 1;
                Value::Boolean(b != 0)
            }
        };
        row.insert(column.name.clone(), value);
    }
    Ok(row)
}

fn truncated(column: &Column) -> DbError {
    DbError::Relation {
        details: format!("stored record is too short for column '{}'", column.name),
    }
}
