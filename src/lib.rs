//! # javadoc-server
//!
//! Serve locally available API documentation over HTTP, straight out of the
//! archives it ships in: JDK documentation bundles and the `*-javadoc.jar`
//! files of a local Maven repository. Archives are opened read-only per
//! request and never unpacked to disk.
//!
//! ## Routes
//!
//! - `/jdk/{key}/{entry...}`: an entry of the JDK documentation archive registered as `key`
//! - `/m2/{groupId}/{artifactId}/{version}/{entry...}`: an entry of that artifact's javadoc jar
//! - `/`: index of the known documentation
//! - `/docs`: getting started
//!
//! ## Example
//!
//! ```no_run
//! use std::net::SocketAddr;
//! use javadoc_server::{AppState, ContentTypeTable, Settings, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load("config.toml".as_ref())?;
//!     let state = AppState::new(settings, ContentTypeTable::load(None));
//!     server::run(SocketAddr::from(([127, 0, 0, 1], 8084)), state).await
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod content_type;
pub mod discovery;
pub mod error;
pub mod io;
pub mod logging;
pub mod pages;
pub mod respond;
pub mod server;
pub mod translate;

pub use archive::{ArchiveEntry, JavadocArchive};
pub use cli::Cli;
pub use config::{DocsConfig, Settings};
pub use content_type::{ContentTypeEntry, ContentTypeTable};
pub use discovery::{MavenArtifact, find_archives, list_artifacts};
pub use io::{LocalFileReader, ReadAt};
pub use respond::{DocResponse, Payload, serve_entry};
pub use server::{AppState, router};
pub use translate::{Resolution, translate_jdk, translate_maven};
