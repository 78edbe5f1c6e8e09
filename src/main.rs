//! Entry point of the javadoc-server binary.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, info};

use javadoc_server::discovery::list_artifacts;
use javadoc_server::logging::init_logging;
use javadoc_server::{AppState, Cli, ContentTypeTable, DocsConfig, Settings, server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Settings::default_path()
            .context("no configuration directory on this platform, pass --config")?,
    };
    let settings = Settings::load(&config_path)?;

    if cli.list {
        list_documentation(&settings, &config_path);
        return Ok(());
    }

    // The content type table is complete before the first request arrives.
    let content_types = ContentTypeTable::load(cli.content_types.as_deref());
    debug!(extensions = content_types.len(), "Content types ready");

    let state = AppState::new(settings, content_types);
    server::run(SocketAddr::new(cli.bind, cli.port), state).await
}

/// Print what the server would offer on its index page.
fn list_documentation(settings: &Settings, config_path: &Path) {
    println!("Configuration: {}", config_path.display());

    println!("\nJDK API:");
    for key in settings.jdk_keys() {
        let archive = settings.jdk_archive(&key).unwrap_or_default();
        println!("  {:<8} {}", key, archive.display());
    }

    println!("\nMaven Repository:");
    let Some(root) = settings.maven_repo_root() else {
        println!("  (not configured)");
        return;
    };
    info!(root = %root.display(), "Scanning for javadoc archives");

    let artifacts = list_artifacts(&root);
    for artifact in &artifacts {
        println!("  {}", artifact);
    }
    println!("\n{} artifacts under {}", artifacts.len(), root.display());
}
