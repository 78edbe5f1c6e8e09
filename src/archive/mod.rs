//! Read-only access to zip and jar documentation archives.
//!
//! ## Architecture
//!
//! - [`structures`]: the fixed-layout records of the format (EOCD, ZIP64 records, headers)
//! - [`parser`]: locating and indexing the central directory
//! - [`reader`]: opening an archive and extracting single entries
//!
//! Only the central directory and the requested entry are read; nothing is
//! ever unpacked to disk.
//!
//! ## Supported Features
//!
//! - Standard zip format and ZIP64 extensions
//! - STORED and DEFLATE entries, which covers every jar produced by the JDK
//!   and by the Maven javadoc plugin
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archives

mod parser;
mod reader;
mod structures;

pub use parser::ArchiveParser;
pub use reader::JavadocArchive;
pub use structures::{ArchiveEntry, CompressionMethod};
