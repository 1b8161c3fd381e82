//! Serving UI assets from an in-memory zip archive.
//!
//! The archive is decompressed once at construction. All file contents live
//! in one contiguous buffer indexed by path, so resolving a request is a hash
//! lookup and a slice.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::ops::Range;

use crate::error::{Result, WebViewError};
use crate::mime::mime_for_path;
use crate::resources::{Resource, ResourceProvider, VIRTUAL_ORIGIN};

/// Decompressed archive contents.
pub struct ArchiveResources {
    data: Vec<u8>,
    entries: HashMap<String, Range<usize>>,
    entry_url: String,
}

impl ArchiveResources {
    /// Read every file entry of a zip blob. Directory entries are skipped.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut data = Vec::new();
        let mut entries = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let start = data.len();
            file.read_to_end(&mut data)
                .map_err(|e| WebViewError::InvalidArchive(format!("{}: {e}", file.name())))?;
            entries.insert(file.name().to_string(), start..data.len());
        }

        log::debug!("Loaded UI archive: {} files, {} bytes", entries.len(), data.len());

        Ok(Self {
            data,
            entries,
            entry_url: format!("{VIRTUAL_ORIGIN}/index.html"),
        })
    }

    /// Number of files in the archive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive holds no files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceProvider for ArchiveResources {
    fn entry_url(&self) -> &str {
        &self.entry_url
    }

    fn resolve(&self, path: &str) -> Option<Resource<'_>> {
        let range = self.entries.get(path)?;
        Some(Resource {
            data: &self.data[range.clone()],
            mime_type: mime_for_path(path),
        })
    }
}

impl std::fmt::Debug for ArchiveResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveResources")
            .field("files", &self.entries.len())
            .field("bytes", &self.data.len())
            .finish()
    }
}
