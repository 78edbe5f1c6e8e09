//! Request path to archive translation.
//!
//! Both rules are pure: they only consult the [`DocsConfig`] lookup and never
//! touch the filesystem, so every outcome can be tested without a server.

use std::path::{Path, PathBuf};

use crate::config::DocsConfig;

/// Separator of entry names inside an archive, whatever the host uses.
pub const ENTRY_SEPARATOR: &str = "/";

/// Outcome of translating a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Serve `entry` out of the archive at `archive`.
    Archive { archive: PathBuf, entry: String },
    /// Too few segments, or segments that cannot name a coordinate.
    BadRequest,
    /// The coordinate is not known.
    NotFound,
    /// No Maven repository has been configured yet.
    GettingStarted,
}

/// Split a request path into percent-decoded, non-empty segments.
///
/// Segments that do not decode to UTF-8 are kept as they came.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        })
        .collect()
}

/// `/jdk/{key}/{entry...}`
pub fn translate_jdk(path: &str, config: &dyn DocsConfig) -> Resolution {
    let segments = path_segments(path);
    let Some(key) = segments.get(1) else {
        return Resolution::BadRequest;
    };
    let Some(archive) = config.jdk_archive(key) else {
        return Resolution::NotFound;
    };

    let rest = &segments[2..];
    if rest.is_empty() {
        return Resolution::BadRequest;
    }

    Resolution::Archive {
        archive,
        entry: rest.join(ENTRY_SEPARATOR),
    }
}

/// `/m2/{groupId}/{artifactId}/{version}/{entry...}`
pub fn translate_maven(path: &str, config: &dyn DocsConfig) -> Resolution {
    let Some(root) = config.maven_repo_root() else {
        return Resolution::GettingStarted;
    };

    let segments = path_segments(path);
    let [_, group_id, artifact_id, version, rest @ ..] = segments.as_slice() else {
        return Resolution::BadRequest;
    };
    if rest.is_empty() {
        return Resolution::BadRequest;
    }
    if ![group_id, artifact_id, version]
        .into_iter()
        .all(|segment| is_plain_segment(segment))
    {
        return Resolution::BadRequest;
    }

    Resolution::Archive {
        archive: maven_archive_path(&root, group_id, artifact_id, version),
        entry: rest.join(ENTRY_SEPARATOR),
    }
}

/// `<root>/<group as directories>/<artifact>/<version>/<artifact>-<version>-javadoc.jar`
pub fn maven_archive_path(root: &Path, group_id: &str, artifact_id: &str, version: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(group_id.split('.'));
    path.push(artifact_id);
    path.push(version);
    path.push(format!("{}-{}-javadoc.jar", artifact_id, version));
    path
}

/// A coordinate segment must stay a single directory name below the repository.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
        && segment.split('.').all(|part| !part.is_empty())
}
