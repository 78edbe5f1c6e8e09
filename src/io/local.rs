use super::ReadAt;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only handle on an archive in the local filesystem.
///
/// The file is closed when the last clone of the reader is dropped, so an
/// archive opened for one request never outlives that request.
pub struct LocalFileReader {
    file: Arc<File>,
    path: PathBuf,
    size: u64,
}

impl LocalFileReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let metadata = file
            .metadata()
            .with_context(|| format!("reading metadata of {}", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("{} is not a regular file", path.display());
        }
        Ok(Self {
            file: Arc::new(file),
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        // Positioned reads block, so they run off the async workers. The
        // blocking task owns its scratch buffer and the result is copied back.
        let file = Arc::clone(&self.file);
        let len = buf.len();
        let chunk = tokio::task::spawn_blocking(move || -> std::io::Result<Vec<u8>> {
            let mut chunk = vec![0u8; len];
            let n = pread(&file, &mut chunk, offset)?;
            chunk.truncate(n);
            Ok(chunk)
        })
        .await
        .context("archive read task failed")?
        .with_context(|| format!("reading {} at offset {}", self.path.display(), offset))?;

        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(unix)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(not(any(unix, windows)))]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
    use std::io::{Read, Seek, SeekFrom};
    let mut file = file;
    file.seek(SeekFrom::Start(offset))?;
    file.read(buf)
}
