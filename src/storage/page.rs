use crate::types::error::{DbError, Result};
use crate::types::{BlockId, RecordId, BLOCK_SZ};

/*
 * Slotted block layout (all integers little-endian u16):
 *
 *   bytes 0..2    number of records (highest id ever assigned)
 *   bytes 2..4    offset of the last byte of free space
 *   bytes 4*id..  per-record slot: size, then offset (0/0 once deleted)
 *   ...
 *   record bodies packed against the end of the block, growing downward
 */

/// A slotted page over one fixed-size block. Record ids are handed out
/// sequentially starting at 1 and survive compaction; a deleted id leaves a
/// tombstone slot and is never reused.
pub struct SlottedPage {
    block_id: BlockId,
    data: Vec<u8>,
    num_records: u16,
    end_free: u16,
}

impl SlottedPage {
    /// Wrap a block buffer. When `is_new`, initialize and write the header;
    /// otherwise parse the header out of the buffer.
    pub fn new(data: Vec<u8>, block_id: BlockId, is_new: bool) -> Result<Self> {
        if data.len() != BLOCK_SZ {
            return Err(DbError::Relation {
                details: format!(
                    "block {} buffer is {} bytes, expected {}",
                    block_id,
                    data.len(),
                    BLOCK_SZ
                ),
            });
        }
        let mut page = SlottedPage {
            block_id,
            data,
            num_records: 0,
            end_free: (BLOCK_SZ - 1) as u16,
        };
        if is_new {
            page.put_header();
        } else {
            page.num_records = page.get_n(0);
            page.end_free = page.get_n(2);
        }
        Ok(page)
    }

    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// The raw block bytes, as they should be written back to the file.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Add a new record. Returns the id assigned to it.
    pub fn add(&mut self, data: &[u8]) -> Result<RecordId> {
        if !self.has_room(data.len()) {
            return Err(DbError::NoRoom {
                block_id: self.block_id,
                needed: data.len(),
            });
        }
        let size = data.len() as u16;
        self.num_records += 1;
        let id = self.num_records;
        self.end_free -= size;
        let loc = self.end_free + 1;
        self.put_header();
        self.put_slot(id, size, loc);
        self.write_at(loc, data);
        Ok(id)
    }

    /// The record's bytes, or `None` for a deleted or never-assigned id.
    pub fn get(&self, id: RecordId) -> Option<Vec<u8>> {
        if id == 0 || id > self.num_records {
            return None;
        }
        let (size, loc) = self.slot(id);
        if loc == 0 {
            return None;
        }
        Some(self.data[loc as usize..loc as usize + size as usize].to_vec())
    }

    /// Replace the record under `id`, sliding neighbors to grow or shrink
    /// it in place.
    pub fn put(&mut self, id: RecordId, data: &[u8]) -> Result<()> {
        let (old_size, loc) = self.live_slot(id)?;
        if data.len() > BLOCK_SZ {
            return Err(DbError::NoRoom {
                block_id: self.block_id,
                needed: data.len(),
            });
        }
        let new_size = data.len() as u16;
        if new_size > old_size {
            let extra = new_size - old_size;
            if !self.has_room(extra as usize) {
                return Err(DbError::NoRoom {
                    block_id: self.block_id,
                    needed: extra as usize,
                });
            }
            self.slide(loc, loc - extra);
            let (_, new_loc) = self.slot(id);
            self.write_at(new_loc, data);
            self.put_slot(id, new_size, new_loc);
        } else {
            self.write_at(loc, data);
            self.slide(loc + new_size, loc + old_size);
            let (_, new_loc) = self.slot(id);
            self.put_slot(id, new_size, new_loc);
        }
        Ok(())
    }

    /// Tombstone the record: its slot is zeroed and the body region
    /// compacted. The id stays reserved.
    pub fn del(&mut self, id: RecordId) -> Result<()> {
        if id == 0 || id > self.num_records {
            return Err(DbError::Relation {
                details: format!("no record {} in block {}", id, self.block_id),
            });
        }
        let (size, loc) = self.slot(id);
        if size == 0 && loc == 0 {
            return Ok(());
        }
        self.put_slot(id, 0, 0);
        self.slide(loc, loc + size);
        Ok(())
    }

    /// Ids of all live records, in increasing order.
    pub fn ids(&self) -> Vec<RecordId> {
        (1..=self.num_records)
            .filter(|&id| {
                let (size, loc) = self.slot(id);
                size != 0 || loc != 0
            })
            .collect()
    }

    /// Room for one more record of `size` bytes, counting its slot entry.
    fn has_room(&self, size: usize) -> bool {
        (self.num_records as usize + 2) * 4 + size <= self.end_free as usize
    }

    /// Shift the packed body region `[end_free+1, start)` by `end - start`
    /// bytes: right (positive) to reclaim space, left (negative) to make
    /// room. Slot offsets at or below `start` are fixed up, and the header
    /// rewritten.
    fn slide(&mut self, start: u16, end: u16) {
        let shift = end as i32 - start as i32;
        if shift == 0 {
            return;
        }
        let begin = self.end_free as usize + 1;
        let src_end = start as usize;
        if src_end > begin {
            let dest = (begin as i32 + shift) as usize;
            self.data.copy_within(begin..src_end, dest);
        }
        for id in self.ids() {
            let (size, loc) = self.slot(id);
            if loc <= start {
                self.put_slot(id, size, (loc as i32 + shift) as u16);
            }
        }
        self.end_free = (self.end_free as i32 + shift) as u16;
        self.put_header();
    }

    /// The slot of a record that must exist and be live.
    fn live_slot(&self, id: RecordId) -> Result<(u16, u16)> {
        if id != 0 && id <= self.num_records {
            let (size, loc) = self.slot(id);
            if size != 0 || loc != 0 {
                return Ok((size, loc));
            }
        }
        Err(DbError::Relation {
            details: format!("no record {} in block {}", id, self.block_id),
        })
    }

    fn slot(&self, id: RecordId) -> (u16, u16) {
        (
            self.get_n(4 * id as usize),
            self.get_n(4 * id as usize + 2),
        )
    }

    fn put_slot(&mut self, id: RecordId, size: u16, loc: u16) {
        self.put_n(4 * id as usize, size);
        self.put_n(4 * id as usize + 2, loc);
    }

    fn put_header(&mut self) {
        self.put_n(0, self.num_records);
        self.put_n(2, self.end_free);
    }

    fn get_n(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.data[offset], self.data[offset + 1]])
    }

    fn put_n(&mut self, offset: usize, n: u16) {
        self.data[offset..offset + 2].copy_from_slice(&n.to_le_bytes());
    }

    fn write_at(&mut self, loc: u16, data: &[u8]) {
        let start = loc as usize;
        self.data[start..start + data.len()].copy_from_slice(data);
    }
}
