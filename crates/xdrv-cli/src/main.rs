// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use xdrv_config::DriverConfig;
use xdrv_port::{Port, PortServer};

#[derive(Parser, Debug)]
#[command(name = "xapian-port", version, about = "Xapian port driver process")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Validate the configuration, print warnings, and exit.
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = xdrv_config::load_config(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("load config from {}", path.display()),
            None => "load config from environment".to_string(),
        })?;
    let warnings = xdrv_config::validate_config(&config).context("validate config")?;

    let filter = if cli.debug {
        EnvFilter::new("xdrv=debug")
    } else {
        EnvFilter::new(format!("xdrv={}", config.log_level()))
    };
    // stdout carries reply frames; logs go to stderr only.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    for warning in &warnings {
        warn!(target: "xdrv.config", %warning, "config warning");
    }

    if cli.check_config {
        for warning in &warnings {
            eprintln!("[warn] {warning}");
        }
        eprintln!("config ok");
        return Ok(());
    }

    serve(&config).await
}

async fn serve(config: &DriverConfig) -> Result<()> {
    info!(
        target: "xdrv.port",
        max_frame_bytes = config.frame_limit(),
        max_reply_bytes = config.reply_limit(),
        "port starting"
    );
    let port: Port = Port::with_reply_limit(config.reply_limit());
    let mut server = PortServer::new(port).with_max_frame_bytes(config.frame_limit());
    server.run().await.context("port loop")?;
    info!(target: "xdrv.port", "port stopped");
    Ok(())
}
