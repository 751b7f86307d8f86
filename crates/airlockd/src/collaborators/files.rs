//! Bounded read-only view of the local filesystem.

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};

use super::{FileEntry, FileStore, FileStoreError};

/// Directory listed when a request carries no path.
pub const DEFAULT_DIRECTORY: &str = "/cf";

/// Listing stops after this many entries.
pub const MAX_LIST_ENTRIES: usize = 50;

/// Reads return at most this many leading bytes.
pub const MAX_READ_BYTES: usize = 1024;

/// File store over the host filesystem with fixed caps.
#[derive(Debug)]
pub struct LocalFileStore {
    default_directory: Utf8PathBuf,
}

impl Default for LocalFileStore {
    fn default() -> Self {
        Self {
            default_directory: Utf8PathBuf::from(DEFAULT_DIRECTORY),
        }
    }
}

impl LocalFileStore {
    /// Builds a store rooted at a different default directory.
    #[must_use]
    pub fn with_default_directory(directory: impl Into<Utf8PathBuf>) -> Self {
        Self {
            default_directory: directory.into(),
        }
    }

    /// Directory used when a listing request names none.
    #[must_use]
    pub fn default_directory(&self) -> &Utf8Path {
        &self.default_directory
    }

    fn admit(path: &Utf8Path) -> Result<(), FileStoreError> {
        if path.as_str().contains("..") || !path.as_str().starts_with('/') {
            return Err(FileStoreError::InvalidPath(
                "invalid file path".to_owned(),
            ));
        }
        Ok(())
    }
}

impl FileStore for LocalFileStore {
    fn list(&self, directory: &Utf8Path) -> Result<Vec<FileEntry>, FileStoreError> {
        Self::admit(directory)?;
        let mut entries = Vec::new();
        for entry in directory.read_dir_utf8()? {
            if entries.len() == MAX_LIST_ENTRIES {
                break;
            }
            let entry = entry?;
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                // Entry vanished between readdir and stat.
                Err(_) => continue,
            };
            entries.push(FileEntry {
                name: entry.file_name().to_owned(),
                size: metadata.len(),
                kind: if metadata.is_dir() { "directory" } else { "file" },
            });
        }
        Ok(entries)
    }

    fn read(&self, path: &Utf8Path) -> Result<String, FileStoreError> {
        Self::admit(path)?;
        let mut file = std::fs::File::open(path)?;
        let mut buffer = vec![0_u8; MAX_READ_BYTES];
        let mut filled = 0;
        loop {
            let read = file.read(&mut buffer[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
            if filled == MAX_READ_BYTES {
                break;
            }
        }
        buffer.truncate(filled);
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
