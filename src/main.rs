use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

use wayfinder::core::config::{self, CliOverrides};
use wayfinder::tui;

#[derive(Parser)]
#[command(name = "wayfinder", about = "Deep-linked record navigation in the terminal")]
struct Args {
    /// Address to open, e.g. /orders/4/items/5
    url: Option<String>,

    /// Route used when the address is `/` or invalid
    #[arg(long)]
    default_path: Option<String>,

    /// Config file (default: ~/.wayfinder/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dismiss/welcome animation length
    #[arg(long)]
    animation_ms: Option<u64>,

    /// Simulated backend latency
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to wayfinder.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(log_file) = File::create("wayfinder.log") {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    let file_config = config::load_config(args.config.as_deref()).map_err(std::io::Error::other)?;
    let cli = CliOverrides {
        default_path: args.default_path,
        animation_ms: args.animation_ms,
        latency_ms: args.latency_ms,
    };
    let resolved = config::resolve(&file_config, &cli);
    let url = args
        .url
        .unwrap_or_else(|| resolved.navigator.default_route.to_url());

    log::info!("Wayfinder starting at {}", url);

    tui::run(resolved, &url)
}
