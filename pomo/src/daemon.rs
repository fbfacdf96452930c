//! Tick loop and process lifecycle
//!
//! The control socket and the tick loop share one [`TimerState`] behind a
//! mutex. Each command and each tick holds the lock for the whole
//! operation, so an interval change (several fields plus a log write) is
//! never observed half done. The display command is spawned after the
//! lock is released.

use crate::config::Icons;
use crate::display::DisplaySink;
use crate::ipc::server;
use crate::timer::TimerState;
use anyhow::{anyhow, Result};
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

pub type SharedState = Arc<Mutex<TimerState>>;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Daemon {
    state: SharedState,
    sink: Arc<dyn DisplaySink>,
    socket_path: PathBuf,
    icons: Icons,
    idle_status: String,
    tick_period: Duration,
}

impl Daemon {
    pub fn new(
        state: TimerState,
        sink: Arc<dyn DisplaySink>,
        socket_path: PathBuf,
        icons: Icons,
        idle_status: String,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            sink,
            socket_path,
            icons,
            idle_status,
            tick_period: TICK_PERIOD,
        }
    }

    #[cfg(test)]
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Serve until `kill`, a termination signal, or a listener failure.
    /// Always removes the socket and blanks the status bar on the way out.
    pub async fn run(self) -> Result<()> {
        let _cleanup = Cleanup {
            socket_path: &self.socket_path,
            sink: self.sink.as_ref(),
            idle_status: &self.idle_status,
        };

        let listener = server::bind(&self.socket_path)?;
        let mut server = tokio::spawn(server::serve(listener, self.state.clone()));

        let outcome = tokio::select! {
            res = self.tick_loop() => res,
            res = &mut server => match res {
                Ok(Ok(())) => Err(anyhow!("IPC server stopped unexpectedly")),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(anyhow!("IPC server task failed: {}", e)),
            },
            _ = shutdown_signal() => {
                info!("Received termination signal");
                Ok(())
            }
        };
        server.abort();

        if let Err(e) = outcome {
            error!("Unexpected error: {:#}", e);
        }
        info!("Terminating pomo daemon");
        Ok(())
    }

    async fn tick_loop(&self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let status = {
                let mut state = self.state.lock().await;
                if state.shutdown_requested() {
                    break;
                }
                let delta = state.take_delta(Instant::now());
                state.update(delta);
                state.status_text(&self.icons)
            };
            self.sink.publish(&status);
        }
        Ok(())
    }
}

/// Runs on every exit path, including unwinding from a panic.
struct Cleanup<'a> {
    socket_path: &'a Path,
    sink: &'a dyn DisplaySink,
    idle_status: &'a str,
}

impl Drop for Cleanup<'_> {
    fn drop(&mut self) {
        // Only our own socket; bind may have failed on someone else's file
        let is_socket = std::fs::symlink_metadata(self.socket_path)
            .map(|meta| meta.file_type().is_socket())
            .unwrap_or(false);
        if is_socket {
            if let Err(e) = std::fs::remove_file(self.socket_path) {
                warn!("Failed to remove socket {:?}: {}", self.socket_path, e);
            }
        }
        self.sink.publish(self.idle_status);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
