use std::path::Path;

use crate::storage::page::SlottedPage;
use crate::storage::recfile::RecFile;
use crate::types::error::Result;
use crate::types::{BlockId, BLOCK_SZ};

/// Heap file organization: one slotted page per record of an underlying
/// fixed-length record file. Block ids are dense, 1-based, and never
/// reused. The record file does the buffering and durability; this layer
/// only moves whole blocks.
pub struct HeapFile {
    name: String,
    rec: RecFile,
    last: BlockId,
    closed: bool,
}

impl HeapFile {
    pub fn new(dir: &Path, name: &str) -> Self {
        let filename = format!("{}.db", name);
        HeapFile {
            name: name.to_string(),
            rec: RecFile::new(dir, &filename, BLOCK_SZ),
            last: 0,
            closed: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the backing file, failing if it exists, with one empty block.
    pub fn create(&mut self) -> Result<()> {
        self.rec.create()?;
        self.closed = false;
        self.last = 0;
        self.get_new()?;
        Ok(())
    }

    /// Close and physically remove the backing file. The heap file must not
    /// be used afterwards.
    pub fn drop_file(&mut self) -> Result<()> {
        self.close()?;
        self.rec.remove()?;
        self.last = 0;
        Ok(())
    }

    pub fn open(&mut self) -> Result<()> {
        if !self.closed {
            return Ok(());
        }
        self.rec.open()?;
        self.last = self.rec.record_count()?;
        self.closed = false;
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.rec.close();
        self.closed = true;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Allocate a fresh empty block, write it out, and return its page.
    pub fn get_new(&mut self) -> Result<SlottedPage> {
        let block_id = self.last + 1;
        let page = SlottedPage::new(vec![0u8; BLOCK_SZ], block_id, true)?;
        self.rec.put(block_id, page.bytes())?;
        self.last = block_id;
        Ok(page)
    }

    /// Read the block into a fresh buffer and return it as a page.
    pub fn get(&mut self, block_id: BlockId) -> Result<SlottedPage> {
        let mut buf = vec![0u8; BLOCK_SZ];
        self.rec.get(block_id, &mut buf)?;
        SlottedPage::new(buf, block_id, false)
    }

    /// Write the page's buffer back under its block id.
    pub fn put(&mut self, page: &SlottedPage) -> Result<()> {
        self.rec.put(page.block_id(), page.bytes())
    }

    /// Dense enumeration of every block id in the file.
    pub fn block_ids(&self) -> Vec<BlockId> {
        (1..=self.last).collect()
    }

    pub fn last_block_id(&self) -> BlockId {
        self.last
    }
}
