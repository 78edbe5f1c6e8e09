//! Low-level parsing of the archive's central directory.
//!
//! The parser reads from any source that implements [`ReadAt`], which keeps
//! it independent of where the archive lives.
//!
//! ## Parsing Strategy
//!
//! Jar and zip files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for the 64-bit counts and offsets
//! 3. Read the whole Central Directory in one go and index it by name
//! 4. For extraction, read the entry's Local File Header to find its data
//!
//! Only the tail of the archive and the requested entry are ever read, so
//! serving one page out of a large JDK documentation bundle stays cheap.

use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};

use super::structures::*;

/// Maximum archive comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for an EOCD followed by a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Upper bound on how much central directory we are willing to buffer.
const MAX_CENTRAL_DIRECTORY_SIZE: u64 = 256 * 1024 * 1024;

/// Central directory reader.
///
/// Generic over the reader type so tests can parse archives held in memory.
/// Typically used through [`JavadocArchive`](super::JavadocArchive).
///
/// ## Example
///
/// ```ignore
/// let parser = ArchiveParser::new(reader);
/// let index = parser.read_index().await?;
/// if let Some(entry) = index.get("index.html") {
///     let offset = parser.data_offset(entry).await?;
///     // Read compressed bytes from offset...
/// }
/// ```
pub struct ArchiveParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: ReadAt> ArchiveParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Tries the common case of an archive without comment first, then
    /// searches backwards through the comment area for the signature.
    ///
    /// # Returns
    ///
    /// A tuple of (EOCD record, offset of EOCD in file).
    ///
    /// # Errors
    ///
    /// Returns an error if no valid EOCD can be found, meaning the file is
    /// not a zip archive at all.
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        if self.size < EndOfCentralDirectory::SIZE as u64 {
            bail!("Not a valid archive: only {} bytes long", self.size);
        }

        let offset = self.size - EndOfCentralDirectory::SIZE as u64;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.reader.read_exact_at(offset, &mut buf).await?;

        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && buf[20..22] == [0, 0] {
            let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
            return Ok((eocd, offset));
        }

        let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.reader.read_exact_at(search_start, &mut buf).await?;

        // The comment length must account for every byte after the record,
        // otherwise the signature is just part of some compressed data.
        for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
            if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                return Ok((eocd, search_start + i as u64));
            }
        }

        bail!("Not a valid archive: no End of Central Directory record")
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// Called when the regular EOCD has saturated fields. The locator sits
    /// immediately before the regular EOCD and points at the ZIP64 record.
    pub async fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64Eocd> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64EocdLocator::SIZE as u64)
            .context("ZIP64 locator would start before the archive")?;
        let mut locator_buf = vec![0u8; Zip64EocdLocator::SIZE];
        self.reader
            .read_exact_at(locator_offset, &mut locator_buf)
            .await?;
        let locator = Zip64EocdLocator::from_bytes(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64Eocd::MIN_SIZE];
        self.reader
            .read_exact_at(locator.eocd64_offset, &mut eocd64_buf)
            .await?;

        Zip64Eocd::from_bytes(&eocd64_buf)
    }

    /// Read the whole Central Directory and index its entries by name.
    ///
    /// When a name occurs twice the first occurrence wins, matching what
    /// most zip readers do.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is invalid, truncated or cannot be read.
    pub async fn read_index(&self) -> Result<HashMap<String, ArchiveEntry>> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset).await?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        if cd_size > MAX_CENTRAL_DIRECTORY_SIZE || cd_offset.saturating_add(cd_size) > self.size {
            bail!(
                "Central Directory out of bounds: {} bytes at offset {} in a {} byte archive",
                cd_size,
                cd_offset,
                self.size
            );
        }

        let mut cd_data = vec![0u8; cd_size as usize];
        self.reader.read_exact_at(cd_offset, &mut cd_data).await?;

        // Each header is at least 46 bytes, which caps the believable count.
        let capacity = total_entries.min(cd_size / 46) as usize;
        let mut index = HashMap::with_capacity(capacity);
        let mut cursor = Cursor::new(cd_data.as_slice());

        for n in 0..total_entries {
            let entry = ArchiveEntry::read_from(&mut cursor)
                .with_context(|| format!("parsing central directory entry {}", n))?;
            index.entry(entry.name.clone()).or_insert(entry);
        }

        Ok(index)
    }

    /// Get the offset of an entry's (possibly compressed) data.
    ///
    /// The Local File Header repeats the name and may carry a different
    /// extra field than the Central Directory, so its lengths are read here.
    pub async fn data_offset(&self, entry: &ArchiveEntry) -> Result<u64> {
        let mut lfh_buf = vec![0u8; LFH_SIZE];
        self.reader
            .read_exact_at(entry.lfh_offset, &mut lfh_buf)
            .await?;

        if &lfh_buf[0..4] != LFH_SIGNATURE {
            bail!("Invalid Local File Header for {}", entry.name);
        }

        let mut cursor = Cursor::new(&lfh_buf[26..]);
        let name_len = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_len = cursor.read_u16::<LittleEndian>()? as u64;

        entry
            .lfh_offset
            .checked_add(LFH_SIZE as u64 + name_len + extra_len)
            .with_context(|| format!("Data offset of {} overflows", entry.name))
    }

    /// Total size of the archive in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}
