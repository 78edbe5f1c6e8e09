//! File extension to MIME type resolution.
//!
//! The table is read once at startup from a properties-style source (the
//! bundled `content-types.properties`, or a user supplied file) and never
//! changes afterwards.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Type returned for names that carry no extension at all.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Type used for every fixed page the server sends.
pub const TEXT_HTML: &str = "text/html";

const BUNDLED_TABLE: &str = include_str!("../resources/content-types.properties");

/// What a user agent is expected to do with a file of this type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Browser,
    Application,
    Save,
    Unknown,
}

impl Action {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "browser" => Action::Browser,
            "application" => Action::Application,
            "save" => Action::Save,
            _ => Action::Unknown,
        }
    }
}

/// One line of the content type table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentTypeEntry {
    pub mimetype: String,
    pub description: Option<String>,
    /// Extensions including their leading `.`
    pub extensions: Vec<String>,
    pub icon: Option<String>,
    pub action: Action,
    pub application: Option<String>,
}

impl ContentTypeEntry {
    fn bare(mimetype: &str, extension: &str) -> Self {
        Self {
            mimetype: mimetype.to_string(),
            description: None,
            extensions: vec![extension.to_string()],
            icon: None,
            action: Action::Unknown,
            application: None,
        }
    }

    /// Build an entry from a mimetype and its `;` separated attributes.
    fn from_attributes(mimetype: &str, attributes: &str) -> Self {
        let mut entry = Self {
            mimetype: mimetype.to_string(),
            description: None,
            extensions: Vec::new(),
            icon: None,
            action: Action::Unknown,
            application: None,
        };

        for attribute in attributes.split(';') {
            let Some((name, value)) = attribute.trim().split_once('=') else {
                continue;
            };
            let value = value.trim();
            match name.trim() {
                "description" => entry.description = non_empty(value),
                "file_extensions" => {
                    entry.extensions = value
                        .split(',')
                        .map(str::trim)
                        .filter(|ext| !ext.is_empty())
                        .map(String::from)
                        .collect();
                }
                "icon" => entry.icon = non_empty(value),
                "action" => entry.action = Action::parse(value),
                "application" => entry.application = non_empty(value),
                _ => {}
            }
        }

        entry
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Extension to content type lookup, shared read-only by all requests.
#[derive(Clone)]
pub struct ContentTypeTable {
    by_extension: HashMap<String, Arc<ContentTypeEntry>>,
}

impl ContentTypeTable {
    /// Load the user table if one is given, the bundled table otherwise.
    ///
    /// A user table that cannot be read is not fatal: the server falls back
    /// to a small built-in table so that at least its own pages render.
    pub fn load(user_table: Option<&Path>) -> Self {
        let Some(path) = user_table else {
            debug!("Loading bundled content types");
            return Self::parse(BUNDLED_TABLE);
        };

        debug!(path = %path.display(), "Loading content types");
        match read_table(path) {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                info!("Could not load content types, using fallback table: {:#}", e);
                let table = Self::fallback();
                info!(
                    "Fallback content types: {}",
                    table.extensions().collect::<Vec<_>>().join(", ")
                );
                table
            }
        }
    }

    /// Parse a properties-style table.
    ///
    /// Entries without `file_extensions` are accepted but index nothing.
    pub fn parse(text: &str) -> Self {
        let mut by_extension = HashMap::new();
        for (mimetype, attributes) in logical_lines(text) {
            let entry = Arc::new(ContentTypeEntry::from_attributes(&mimetype, &attributes));
            for extension in &entry.extensions {
                by_extension.insert(extension.clone(), Arc::clone(&entry));
            }
        }
        Self { by_extension }
    }

    /// The built-in table used when the configured one is unreadable.
    pub fn fallback() -> Self {
        const FALLBACK: [(&str, &str); 14] = [
            (".css", "text/css"),
            (".gif", "image/gif"),
            (".html", TEXT_HTML),
            (".jpg", "image/jpeg"),
            (".js", "application/javascript"),
            (".png", "image/png"),
            (".svg", "image/svg+xml"),
            (".woff", "font/woff"),
            (".woff2", "font/woff2"),
            (".eot", "application/vnd.ms-fontobject"),
            (".ttf", "font/ttf"),
            (".otf", "font/otf"),
            (".xml", "text/xml"),
            (".zip", "application/zip"),
        ];

        let by_extension = FALLBACK
            .iter()
            .map(|(ext, mimetype)| {
                (
                    ext.to_string(),
                    Arc::new(ContentTypeEntry::bare(mimetype, ext)),
                )
            })
            .collect();
        Self { by_extension }
    }

    /// Content type for a file name or an archive entry path.
    ///
    /// Returns `application/octet-stream` for names without an extension and
    /// `None` for extensions the table does not know; callers pick their own
    /// default in that case.
    pub fn content_type_for(&self, file_name: &str) -> Option<&str> {
        let base = file_name.rsplit('/').next().unwrap_or(file_name);
        let Some(dot) = base.rfind('.') else {
            info!(file_name, "No file extension, sending as {}", OCTET_STREAM);
            return Some(OCTET_STREAM);
        };

        match self.by_extension.get(&base[dot..]) {
            Some(entry) => Some(entry.mimetype.as_str()),
            None => {
                info!(file_name, "No content type registered for extension");
                None
            }
        }
    }

    /// The entry registered for an extension such as `.html`.
    pub fn entry_for_extension(&self, extension: &str) -> Option<&ContentTypeEntry> {
        self.by_extension.get(extension).map(Arc::as_ref)
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions.into_iter()
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

impl fmt::Debug for ContentTypeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentTypeTable")
            .field("extensions", &self.len())
            .finish()
    }
}

fn read_table(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Split properties text into `(key, value)` pairs.
///
/// Handles `#`/`!` comments, blank lines, `\` continuations (leading
/// whitespace of the continued line is dropped) and both `=` and `:` as
/// separator.
fn logical_lines(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut pending = String::new();

    for raw in text.lines() {
        let line = if pending.is_empty() {
            raw.trim()
        } else {
            raw.trim_start()
        };
        if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        // An even run of trailing backslashes is escaped text, not a continuation.
        let trailing = line.len() - line.trim_end_matches('\\').len();
        if trailing % 2 == 1 {
            pending.push_str(&line[..line.len() - 1]);
            continue;
        }
        pending.push_str(line);

        let logical = std::mem::take(&mut pending);
        if let Some(pair) = split_key_value(&logical) {
            pairs.push(pair);
        }
    }

    if !pending.is_empty() {
        if let Some(pair) = split_key_value(&pending) {
            pairs.push(pair);
        }
    }

    pairs
}

fn split_key_value(line: &str) -> Option<(String, String)> {
    let split = line.find(['=', ':'])?;
    let key = line[..split].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), line[split + 1..].trim().to_string()))
}
