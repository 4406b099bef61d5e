use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::types::error::{DbError, Result};

/// Fixed-length record file addressed by 1-based record numbers.
///
/// This is the storage substrate under every heap file: one physical file
/// holding records of a single fixed length, with put/get/del by record
/// number and a count of currently allocated records.
pub struct RecFile {
    path: PathBuf,
    name: String,
    record_len: usize,
    file: Option<File>,
}

impl RecFile {
    pub fn new(dir: &Path, name: &str, record_len: usize) -> Self {
        RecFile {
            path: dir.join(name),
            name: name.to_string(),
            record_len,
            file: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the file, failing if it already exists, and leave it open.
    pub fn create(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Err(DbError::FileExists {
                name: self.name.clone(),
            });
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| self.map_open_err(e))?;
        self.file = Some(file);
        Ok(())
    }

    /// Open an existing file. A no-op when already open.
    pub fn open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| self.map_open_err(e))?;
        self.file = Some(file);
        Ok(())
    }

    pub fn close(&mut self) {
        self.file = None;
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Write the record under `id`, creating or replacing it.
    pub fn put(&mut self, id: u32, data: &[u8]) -> Result<()> {
        debug_assert_eq!(data.len(), self.record_len);
        let offset = self.offset_of(id)?;
        let file = self.handle_mut()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }

    /// Read the record under `id` into `buf`.
    pub fn get(&mut self, id: u32, buf: &mut [u8]) -> Result<()> {
        debug_assert_eq!(buf.len(), self.record_len);
        let offset = self.offset_of(id)?;
        let file = self.handle_mut()?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    /// Zero-fill the record under `id`. Record numbers are stable: deletion
    /// never renumbers later records.
    pub fn del(&mut self, id: u32) -> Result<()> {
        let zeros = vec![0u8; self.record_len];
        self.put(id, &zeros)
    }

    /// Number of records currently allocated in the file.
    pub fn record_count(&mut self) -> Result<u32> {
        let len = self.handle_mut()?.metadata()?.len();
        Ok((len / self.record_len as u64) as u32)
    }

    /// Close and physically remove the file.
    pub fn remove(&mut self) -> Result<()> {
        self.close();
        fs::remove_file(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DbError::FileNotFound {
                name: self.name.clone(),
            },
            _ => DbError::Io(e),
        })
    }

    fn offset_of(&self, id: u32) -> Result<u64> {
        if id == 0 {
            return Err(DbError::Relation {
                details: format!("record numbers in '{}' start at 1", self.name),
            });
        }
        Ok((id as u64 - 1) * self.record_len as u64)
    }

    fn handle_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(|| DbError::FileClosed {
            name: self.name.clone(),
        })
    }

    fn map_open_err(&self, e: io::Error) -> DbError {
        match e.kind() {
            io::ErrorKind::AlreadyExists => DbError::FileExists {
                name: self.name.clone(),
            },
            io::ErrorKind::NotFound => DbError::FileNotFound {
                name: self.name.clone(),
            },
            _ => DbError::Io(e),
        }
    }
}
