pub mod error;
pub mod row;
pub mod value;

// Common type aliases
pub type BlockId = u32;
pub type RecordId = u16;

/// Address of one row within a relation: (block id, record id).
pub type Handle = (BlockId, RecordId);

/// Fixed size of every block in every heap file.
pub const BLOCK_SZ: usize = 4096;
