mod common;

use std::sync::Arc;

use common::ArchiveBuilder;
use javadoc_server::archive::{CompressionMethod, JavadocArchive};

const PAGE: &[u8] = b"<!DOCTYPE html><html><body>String</body></html>";

fn sample() -> ArchiveBuilder {
    ArchiveBuilder::new()
        .stored("index.html", b"<html>index</html>")
        .directory("java/lang")
        .deflated("java/lang/String.html", PAGE)
        .stored("element-list", b"java.lang\n")
}

#[tokio::test]
async fn reads_stored_and_deflated_entries() {
    let archive = JavadocArchive::from_reader(Arc::new(sample().build()))
        .await
        .unwrap();
    assert_eq!(archive.len(), 4);

    let stored = archive.entry("index.html").unwrap();
    assert_eq!(stored.compression_method, CompressionMethod::Stored);
    assert_eq!(archive.read_entry(stored).await.unwrap(), b"<html>index</html>");

    let deflated = archive.entry("java/lang/String.html").unwrap();
    assert_eq!(deflated.compression_method, CompressionMethod::Deflate);
    assert_eq!(deflated.uncompressed_size, PAGE.len() as u64);
    assert_eq!(archive.read_entry(deflated).await.unwrap(), PAGE);
}

#[tokio::test]
async fn directories_are_not_entries() {
    let archive = JavadocArchive::from_reader(Arc::new(sample().build()))
        .await
        .unwrap();
    assert!(archive.entry("java/lang/").is_none());
    assert!(archive.entry("java/lang").is_none());
    assert!(archive.entry("missing.html").is_none());
    assert!(archive.entry("").is_none());
}

#[tokio::test]
async fn finds_the_directory_behind_a_comment() {
    let bytes = sample().comment(b"generated by javadoc").build();
    let archive = JavadocArchive::from_reader(Arc::new(bytes)).await.unwrap();
    assert!(archive.entry("index.html").is_some());
}

#[tokio::test]
async fn reads_zip64_directories() {
    let archive = JavadocArchive::from_reader(Arc::new(sample().zip64().build()))
        .await
        .unwrap();
    let entry = archive.entry("java/lang/String.html").unwrap();
    assert_eq!(archive.read_entry(entry).await.unwrap(), PAGE);
}

#[tokio::test]
async fn empty_archive_has_no_entries() {
    let archive = JavadocArchive::from_reader(Arc::new(ArchiveBuilder::new().build()))
        .await
        .unwrap();
    assert!(archive.is_empty());
}

#[tokio::test]
async fn rejects_data_that_is_not_an_archive() {
    let garbage = b"<html>definitely not a zip file</html>".to_vec();
    assert!(JavadocArchive::from_reader(Arc::new(garbage)).await.is_err());
    assert!(JavadocArchive::from_reader(Arc::new(Vec::new())).await.is_err());
}

#[tokio::test]
async fn rejects_a_truncated_archive() {
    let bytes = sample().build();
    // Keep the EOCD but cut away the start of the central directory.
    let truncated = bytes[bytes.len() - 40..].to_vec();
    assert!(JavadocArchive::from_reader(Arc::new(truncated)).await.is_err());
}

#[tokio::test]
async fn detects_corrupted_content() {
    let mut bytes = sample().build();
    let pos = bytes
        .windows(5)
        .position(|w| w == b"index")
        .and_then(|first| {
            // Skip the name in the local header, find the content.
            bytes[first + 5..]
                .windows(5)
                .position(|w| w == b"index")
                .map(|p| p + first + 5)
        })
        .unwrap();
    bytes[pos] = b'I';

    let archive = JavadocArchive::from_reader(Arc::new(bytes)).await.unwrap();
    let entry = archive.entry("index.html").unwrap().clone();
    assert!(archive.read_entry(&entry).await.is_err());
}

#[tokio::test]
async fn opens_archives_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docs.zip");
    sample().write_to(&path);

    let archive = JavadocArchive::open(&path).await.unwrap();
    let names: Vec<&str> = {
        let mut names: Vec<&str> = archive.entry_names().collect();
        names.sort_unstable();
        names
    };
    assert_eq!(
        names,
        vec!["element-list", "index.html", "java/lang/", "java/lang/String.html"]
    );
    let entry = archive.entry("element-list").unwrap();
    assert_eq!(archive.read_entry(entry).await.unwrap(), b"java.lang\n");

    assert!(JavadocArchive::open(&dir.path().join("missing.zip")).await.is_err());
}

#[tokio::test]
async fn sizes_beyond_the_archive_are_rejected() {
    for claimed in [1u64 << 44, 1 << 63, u64::MAX] {
        let bytes = ArchiveBuilder::new()
            .stored("index.html", b"<html>index</html>")
            .oversized("huge.html", b"<html>small</html>", claimed)
            .build();
        let archive = JavadocArchive::from_reader(Arc::new(bytes)).await.unwrap();

        let entry = archive.entry("huge.html").unwrap();
        assert_eq!(entry.compressed_size, claimed);
        assert!(archive.read_entry(entry).await.is_err(), "{}", claimed);

        // The rest of the archive stays readable.
        let index = archive.entry("index.html").unwrap();
        assert_eq!(archive.read_entry(index).await.unwrap(), b"<html>index</html>");
    }
}

#[tokio::test]
async fn inflation_stops_past_the_declared_size() {
    let mut bytes = ArchiveBuilder::new()
        .deflated("zeros.bin", &[0u8; 64 * 1024])
        .build();

    // Shrink the uncompressed size in the central directory header.
    let eocd = bytes.len() - 22;
    let cd_offset = u32::from_le_bytes(bytes[eocd + 16..eocd + 20].try_into().unwrap()) as usize;
    bytes[cd_offset + 24..cd_offset + 28].copy_from_slice(&16u32.to_le_bytes());

    let archive = JavadocArchive::from_reader(Arc::new(bytes)).await.unwrap();
    let entry = archive.entry("zeros.bin").unwrap();
    assert_eq!(entry.uncompressed_size, 16);
    let err = archive.read_entry(entry).await.unwrap_err();
    assert!(err.to_string().contains("Size mismatch"), "{:#}", err);
}
