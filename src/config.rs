//! Where the documentation archives live.
//!
//! The rest of the crate only sees the [`DocsConfig`] lookup; [`Settings`]
//! backs it with a small TOML file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Lookup of known documentation archives.
pub trait DocsConfig: Send + Sync {
    /// Archive holding the documentation of a JDK release, if registered.
    fn jdk_archive(&self, key: &str) -> Option<PathBuf>;

    /// Root of the local Maven repository, `None` when unset or empty.
    fn maven_repo_root(&self) -> Option<PathBuf>;

    /// Every registered JDK key, in a stable order.
    fn jdk_keys(&self) -> Vec<String>;
}

/// Persistent settings, stored as TOML:
///
/// ```toml
/// [jdk-docs]
/// "11" = "/opt/docs/jdk-11.0.2_doc-all.zip"
///
/// [m2-repos]
/// default = "/home/me/.m2/repository"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// JDK release key to documentation archive
    pub jdk_docs: BTreeMap<String, PathBuf>,
    pub m2_repos: MavenRepos,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MavenRepos {
    pub default: Option<PathBuf>,
}

impl Settings {
    /// `<config dir>/javadoc-server/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("javadoc-server").join("config.toml"))
    }

    /// Load settings from `path`. A missing file means nothing is configured yet.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No configuration file, starting unconfigured");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };

        let settings = Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))?;
        debug!(
            path = %path.display(),
            jdk_docs = settings.jdk_docs.len(),
            m2_repo = ?settings.m2_repos.default,
            "Loaded configuration"
        );
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// True when neither JDK docs nor a Maven repository are set up.
    pub fn is_unconfigured(&self) -> bool {
        self.jdk_docs.is_empty() && self.maven_repo_root().is_none()
    }
}

impl DocsConfig for Settings {
    fn jdk_archive(&self, key: &str) -> Option<PathBuf> {
        self.jdk_docs
            .get(key)
            .filter(|path| !path.as_os_str().is_empty())
            .cloned()
    }

    fn maven_repo_root(&self) -> Option<PathBuf> {
        self.m2_repos
            .default
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
            .cloned()
    }

    fn jdk_keys(&self) -> Vec<String> {
        self.jdk_docs.keys().cloned().collect()
    }
}
