use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod daemon;
mod display;
mod interval;
mod ipc;
mod record;
mod timer;

use daemon::Daemon;
use record::CsvRecorder;
use timer::TimerState;

#[derive(Parser)]
#[command(name = "pomo")]
#[command(about = "Pomodoro timer daemon", long_about = None)]
struct Cli {
    /// What you're working on
    #[arg(short, long, default_value = "")]
    description: String,
    /// Control socket path (defaults to pomo.sock next to this executable)
    #[arg(long)]
    socket: Option<PathBuf>,
    /// Config file to use instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;
    init_logging(&config.log_path());

    let socket_path = match cli.socket.or_else(|| config.socket_path.clone()) {
        Some(path) => path,
        None => pomo_ipc::default_socket_path().context("Failed to locate control socket")?,
    };

    let recorder = CsvRecorder::new(config.record_path());
    recorder.prepare()?;
    info!("Recording activity to {:?}", recorder.path());

    let state = TimerState::new(cli.description, Box::new(recorder));
    let sink = display::from_config(&config.display);
    let daemon = Daemon::new(
        state,
        sink,
        socket_path,
        config.icons.clone(),
        config.display.idle_status.clone(),
    );
    daemon.run().await
}

fn init_logging(log_path: &Path) {
    let filter = || {
        EnvFilter::try_from_env("POMO_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("debug"))
    };

    if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Failed to create log directory {:?}: {}", dir, e);
        }
    }
    let installed = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init(),
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .try_init()
        }
    };
    if let Err(e) = installed {
        eprintln!("Failed to install logger: {}", e);
    }
}
