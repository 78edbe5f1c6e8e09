use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8084;

#[derive(Parser, Debug)]
#[command(name = "javadoc-server")]
#[command(version)]
#[command(about = "Serve JDK and Maven javadoc straight out of their archives", long_about = None)]
#[command(after_help = "Documentation locations are read from the configuration file.\n\
  Start the server and open http://localhost:8084/docs to get started.\n\n\
Examples:\n  \
  javadoc-server                 serve on the default port\n  \
  javadoc-server 9000 -v         serve on port 9000 with debug logging\n  \
  javadoc-server -l              list the documentation that would be served")]
pub struct Cli {
    /// Port the server will listen on
    #[arg(value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(short = 'b', long = "bind", value_name = "ADDR", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Configuration file (default: <config dir>/javadoc-server/config.toml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Content type table to use instead of the bundled one
    #[arg(long = "content-types", value_name = "FILE", env = "JAVADOC_SERVER_CONTENT_TYPES")]
    pub content_types: Option<PathBuf>,

    /// List known JDK docs and Maven javadoc archives, then exit
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Less logging (-q warnings only, -qq errors only)
    #[arg(short = 'q', action = clap::ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (0, 0) => "info",
            (0, 1) => "debug",
            (0, _) => "trace",
            (1, _) => "warn",
            _ => "error",
        }
    }
}
