//! Archive fixtures built in memory, the way the javadoc tools lay them out.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::Crc;
use flate2::write::DeflateEncoder;

struct Entry {
    name: String,
    content: Vec<u8>,
    deflate: bool,
    /// Compressed size announced through a ZIP64 extra field instead of the real one.
    claimed_size: Option<u64>,
}

/// Builder for small zip archives.
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<Entry>,
    comment: Vec<u8>,
    zip64: bool,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry stored without compression.
    pub fn stored(self, name: &str, content: &[u8]) -> Self {
        self.entry(name, content, false, None)
    }

    /// Add a DEFLATE compressed entry.
    pub fn deflated(self, name: &str, content: &[u8]) -> Self {
        self.entry(name, content, true, None)
    }

    /// Add a stored entry whose central directory header claims
    /// `compressed_size` bytes through the ZIP64 extra field.
    pub fn oversized(self, name: &str, content: &[u8], compressed_size: u64) -> Self {
        self.entry(name, content, false, Some(compressed_size))
    }

    fn entry(
        mut self,
        name: &str,
        content: &[u8],
        deflate: bool,
        claimed_size: Option<u64>,
    ) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            content: content.to_vec(),
            deflate,
            claimed_size,
        });
        self
    }

    /// Add a directory entry.
    pub fn directory(self, name: &str) -> Self {
        self.stored(&format!("{}/", name.trim_end_matches('/')), b"")
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    /// Put the central directory location in ZIP64 records.
    pub fn zip64(mut self) -> Self {
        self.zip64 = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for Entry {
            name,
            content,
            deflate,
            claimed_size,
        } in &self.entries
        {
            let mut crc = Crc::new();
            crc.update(content);
            let data = if *deflate {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(content).unwrap();
                encoder.finish().unwrap()
            } else {
                content.clone()
            };
            let method: u16 = if *deflate { 8 } else { 0 };
            let offset = out.len() as u32;

            out.write_all(b"PK\x03\x04").unwrap();
            out.write_u16::<LittleEndian>(20).unwrap(); // version needed
            out.write_u16::<LittleEndian>(0).unwrap(); // flags
            out.write_u16::<LittleEndian>(method).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap(); // time and date
            out.write_u32::<LittleEndian>(crc.sum()).unwrap();
            out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(content.len() as u32).unwrap();
            out.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap(); // extra length
            out.write_all(name.as_bytes()).unwrap();
            out.write_all(&data).unwrap();

            central.write_all(b"PK\x01\x02").unwrap();
            central.write_u16::<LittleEndian>(20).unwrap(); // version made by
            central.write_u16::<LittleEndian>(20).unwrap(); // version needed
            central.write_u16::<LittleEndian>(0).unwrap(); // flags
            central.write_u16::<LittleEndian>(method).unwrap();
            central.write_u32::<LittleEndian>(0).unwrap(); // time and date
            central.write_u32::<LittleEndian>(crc.sum()).unwrap();
            match claimed_size {
                Some(_) => central.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap(),
                None => central.write_u32::<LittleEndian>(data.len() as u32).unwrap(),
            }
            central.write_u32::<LittleEndian>(content.len() as u32).unwrap();
            central.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            let extra_len = if claimed_size.is_some() { 12 } else { 0 };
            central.write_u16::<LittleEndian>(extra_len).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap(); // comment length
            central.write_u16::<LittleEndian>(0).unwrap(); // disk start
            central.write_u16::<LittleEndian>(0).unwrap(); // internal attributes
            central.write_u32::<LittleEndian>(0).unwrap(); // external attributes
            central.write_u32::<LittleEndian>(offset).unwrap();
            central.write_all(name.as_bytes()).unwrap();
            if let Some(size) = claimed_size {
                central.write_u16::<LittleEndian>(0x0001).unwrap();
                central.write_u16::<LittleEndian>(8).unwrap();
                central.write_u64::<LittleEndian>(*size).unwrap();
            }
        }

        let count = self.entries.len();
        let cd_offset = out.len() as u64;
        out.write_all(&central).unwrap();

        if self.zip64 {
            let eocd64_offset = out.len() as u64;
            out.write_all(b"PK\x06\x06").unwrap();
            out.write_u64::<LittleEndian>(44).unwrap(); // size of the rest of the record
            out.write_u16::<LittleEndian>(45).unwrap();
            out.write_u16::<LittleEndian>(45).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(count as u64).unwrap();
            out.write_u64::<LittleEndian>(count as u64).unwrap();
            out.write_u64::<LittleEndian>(central.len() as u64).unwrap();
            out.write_u64::<LittleEndian>(cd_offset).unwrap();

            out.write_all(b"PK\x06\x07").unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(eocd64_offset).unwrap();
            out.write_u32::<LittleEndian>(1).unwrap();
        }

        out.write_all(b"PK\x05\x06").unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        if self.zip64 {
            out.write_u16::<LittleEndian>(0xFFFF).unwrap();
            out.write_u16::<LittleEndian>(0xFFFF).unwrap();
            out.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap();
            out.write_u32::<LittleEndian>(0xFFFFFFFF).unwrap();
        } else {
            out.write_u16::<LittleEndian>(count as u16).unwrap();
            out.write_u16::<LittleEndian>(count as u16).unwrap();
            out.write_u32::<LittleEndian>(central.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(cd_offset as u32).unwrap();
        }
        out.write_u16::<LittleEndian>(self.comment.len() as u16).unwrap();
        out.write_all(&self.comment).unwrap();
        out
    }

    /// Write the archive to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, self.build()).unwrap();
    }
}
