use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use flate2::Crc;
use flate2::read::DeflateDecoder;

use crate::io::{LocalFileReader, ReadAt};

use super::parser::ArchiveParser;
use super::structures::{ArchiveEntry, CompressionMethod};

/// Upper bound on the buffer reserved up front for an inflated entry.
const MAX_PREALLOCATION: u64 = 1024 * 1024;

/// An opened documentation archive with its entry index.
///
/// The underlying handle is released when the value is dropped.
pub struct JavadocArchive<R: ReadAt> {
    parser: ArchiveParser<R>,
    entries: HashMap<String, ArchiveEntry>,
}

impl JavadocArchive<LocalFileReader> {
    /// Open an archive on disk read-only and index its central directory.
    pub async fn open(path: &Path) -> Result<Self> {
        let reader = LocalFileReader::open(path)?;
        Self::from_reader(Arc::new(reader))
            .await
            .with_context(|| format!("indexing {}", path.display()))
    }
}

impl<R: ReadAt> JavadocArchive<R> {
    pub async fn from_reader(reader: Arc<R>) -> Result<Self> {
        let parser = ArchiveParser::new(reader);
        let entries = parser.read_index().await?;
        Ok(Self { parser, entries })
    }

    /// Look up a file entry by its `/` separated name. Directory entries are
    /// not considered files.
    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.get(name).filter(|e| !e.is_directory())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of all entries, in no particular order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Read and decompress an entry, checking its size and CRC-32.
    pub async fn read_entry(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let data_offset = self.parser.data_offset(entry).await?;
        let data_end = data_offset
            .checked_add(entry.compressed_size)
            .filter(|end| *end <= self.parser.size());
        if data_end.is_none() {
            bail!(
                "Data of {} out of bounds: {} bytes at offset {} in a {} byte archive",
                entry.name,
                entry.compressed_size,
                data_offset,
                self.parser.size()
            );
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_exact_at(data_offset, &mut raw)
            .await
            .with_context(|| format!("reading data of {}", entry.name))?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => {
                // One byte past the declared size is enough to detect a mismatch.
                let limit = entry.uncompressed_size.saturating_add(1);
                let mut out =
                    Vec::with_capacity(entry.uncompressed_size.min(MAX_PREALLOCATION) as usize);
                DeflateDecoder::new(raw.as_slice())
                    .take(limit)
                    .read_to_end(&mut out)
                    .with_context(|| format!("inflating {}", entry.name))?;
                out
            }
            CompressionMethod::Unknown(method) => {
                bail!(
                    "Unsupported compression method {} for {}",
                    method,
                    entry.name
                );
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            bail!(
                "Size mismatch for {}: expected {} bytes, got {}",
                entry.name,
                entry.uncompressed_size,
                data.len()
            );
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            bail!(
                "CRC mismatch for {}: expected {:08x}, got {:08x}",
                entry.name,
                entry.crc32,
                crc.sum()
            );
        }

        Ok(data)
    }
}
