//! Build report server.
//!
//! Loads report documents from a directory and serves them on
//! `localhost:38000`. The main thread owns the report store and drains the
//! request queue on a fixed tick; the listener runs on its own thread.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use build_report_server::config::{load_config, ServerConfig};
use build_report_server::observability::init_logging;
use build_report_server::report::MemoryReportStore;
use build_report_server::ReportServer;

#[derive(Parser)]
#[command(name = "build-report-server")]
#[command(about = "Serve build reports to local tools", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of report JSON documents (overrides the config file).
    #[arg(short, long)]
    reports: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(dir) = cli.reports {
        config.reports.directory = dir;
    }

    init_logging(&config.observability.log_filter);
    tracing::info!("build-report-server v{} starting", env!("CARGO_PKG_VERSION"));

    let store = MemoryReportStore::load_dir(&config.reports.directory)?;
    if store.is_empty() {
        tracing::warn!(
            directory = %config.reports.directory.display(),
            "No reports found; every request will return {{}}"
        );
    }

    let mut server = ReportServer::new(config.service.clone());
    let mut pump = server.start()?;

    // The main thread is the owner thread: a current-thread runtime keeps
    // the store on it while waiting for ticks and Ctrl+C.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let mut tick = tokio::time::interval(Duration::from_millis(config.owner.tick_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
                _ = tick.tick() => {
                    pump.drain(&store);
                    let state = server.state();
                    if pump.is_disconnected() || (state.is_settled() && !state.is_running()) {
                        tracing::error!(?state, "Listener is not running");
                        break;
                    }
                }
            }
        }
    });

    server.stop()?;
    tracing::info!("Shutdown complete");
    Ok(())
}
