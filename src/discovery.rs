//! Finding `*-javadoc.jar` archives in a Maven repository.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{trace, warn};
use walkdir::WalkDir;

static JAVADOC_ARCHIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-javadoc\.jar$").expect("javadoc archive pattern is valid"));

/// True for file names following the Maven javadoc archive convention.
pub fn is_javadoc_archive(file_name: &str) -> bool {
    JAVADOC_ARCHIVE.is_match(file_name)
}

/// Walk `root` lazily and yield, for every javadoc archive found, the
/// directory holding it relative to `root` (`group/path/artifact/version`).
///
/// Entries that cannot be visited are logged and skipped. A missing root
/// yields nothing.
pub fn find_archives(root: &Path) -> impl Iterator<Item = PathBuf> + use<> {
    let root = root.to_path_buf();
    let walk = root
        .exists()
        .then(|| WalkDir::new(&root).follow_links(true).into_iter());

    walk.into_iter().flatten().filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry while scanning {}: {}", root.display(), e);
                return None;
            }
        };

        if entry.file_type().is_dir() {
            trace!(dir = %entry.path().display(), "Scanning");
            return None;
        }
        if !entry.file_type().is_file() {
            return None;
        }

        let name = entry.file_name().to_str()?;
        if !is_javadoc_archive(name) {
            return None;
        }

        let dir = entry.path().parent()?.strip_prefix(&root).ok()?.to_path_buf();
        trace!(dir = %dir.display(), "Adding javadoc archive");
        Some(dir)
    })
}

/// Every javadoc archive under `root` as Maven coordinates, sorted.
pub fn list_artifacts(root: &Path) -> Vec<MavenArtifact> {
    let mut artifacts: Vec<MavenArtifact> = find_archives(root)
        .filter_map(|dir| MavenArtifact::from_relative_dir(&dir))
        .collect();
    artifacts.sort();
    artifacts
}

/// Maven coordinates recovered from a discovered directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl MavenArtifact {
    /// Split `org/apache/commons/commons-lang3/3.12.0` into
    /// `org.apache.commons`, `commons-lang3` and `3.12.0`.
    pub fn from_relative_dir(dir: &Path) -> Option<Self> {
        let parts: Vec<String> = dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let [group @ .., artifact_id, version] = parts.as_slice() else {
            return None;
        };
        if group.is_empty() {
            return None;
        }

        Some(Self {
            group_id: group.join("."),
            artifact_id: artifact_id.clone(),
            version: version.clone(),
        })
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}
