//! Sluice CLI - Command-line interface
//!
//! Starts the file delivery server with flags layered over environment
//! configuration.

use std::path::PathBuf;

use clap::Parser;
use sluice_core::SluiceConfig;
use sluice_core::delivery::OffloadMode;
use sluice_core::tracing_setup::{CliLogLevel, init_tracing};
use sluice_web::run_server;

#[derive(Parser)]
#[command(name = "sluice")]
#[command(about = "A single-file HTTP delivery server")]
struct Cli {
    /// Directory to serve files from
    #[arg(long)]
    root: Option<PathBuf>,

    /// Socket address to listen on
    #[arg(long)]
    listen: Option<String>,

    /// Transfer offload mechanism the hosting server provides
    #[arg(long, value_enum, default_value = "none")]
    offload: OffloadArg,

    /// Internal location prefix for internal-redirect offload
    #[arg(long, default_value = "/protected")]
    offload_location: String,

    /// Disable byte-range request support
    #[arg(long)]
    no_ranges: bool,

    /// Console log level (full debug always goes to logs/)
    #[arg(long, value_enum, default_value = "info")]
    log_level: CliLogLevel,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OffloadArg {
    /// Stream everything through the application
    None,
    /// Emit X-Sendfile headers
    Sendfile,
    /// Emit X-Accel-Redirect headers
    InternalRedirect,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_tracing_level(), None)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let mut config = SluiceConfig::from_env();
    if let Some(root) = cli.root {
        config.server.root_dir = root;
    }
    if let Some(listen) = cli.listen {
        config.server.bind_address = listen;
    }
    if cli.no_ranges {
        config.delivery.range_enabled = false;
    }
    config.offload.mode = match cli.offload {
        OffloadArg::None => config.offload.mode,
        OffloadArg::Sendfile => OffloadMode::SendfileHeader,
        OffloadArg::InternalRedirect => OffloadMode::InternalRedirect {
            location: cli.offload_location,
        },
    };

    run_server(config).await?;

    Ok(())
}
