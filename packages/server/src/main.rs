#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the crash stats API server.

use clap::Parser;
use crash_stats_server::config::ServerConfig;

#[derive(Parser)]
#[command(
    name = "crash_stats_server",
    about = "Serves cyclist and pedestrian crash statistics"
)]
struct Cli {
    /// Compute the statistics before accepting requests
    #[arg(long)]
    warm: bool,
    /// Address to bind (overrides `BIND_ADDR`)
    #[arg(long)]
    bind_addr: Option<String>,
    /// Port to listen on (overrides `PORT`)
    #[arg(long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env();
    config.warm |= cli.warm;
    if let Some(bind_addr) = cli.bind_addr {
        config.bind_addr = bind_addr;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    crash_stats_server::run_server(config).await
}
