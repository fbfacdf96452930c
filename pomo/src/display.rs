//! Status bar output

use crate::config::Display;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Receives the status line once per tick. Fire-and-forget.
pub trait DisplaySink: Send + Sync {
    fn publish(&self, status: &str);
}

/// Runs `program args.. <status>` for every update.
pub struct CommandSink {
    program: String,
    args: Vec<String>,
    warned: AtomicBool,
}

impl CommandSink {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            warned: AtomicBool::new(false),
        }
    }

    fn report_failure(&self, err: std::io::Error) {
        // A missing status bar would otherwise fill the log every second
        if self.warned.swap(true, Ordering::Relaxed) {
            debug!("Display command {} failed: {}", self.program, err);
        } else {
            warn!("Display command {} failed: {}", self.program, err);
        }
    }
}

impl DisplaySink for CommandSink {
    fn publish(&self, status: &str) {
        let spawned = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(status)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                let program = self.program.clone();
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(exit) if !exit.success() => {
                            debug!("Display command {} exited with {}", program, exit)
                        }
                        Ok(_) => {}
                        Err(e) => debug!("Failed to wait for {}: {}", program, e),
                    }
                });
            }
            Err(e) => self.report_failure(e),
        }
    }
}

/// Used when no display program is configured.
pub struct NullSink;

impl DisplaySink for NullSink {
    fn publish(&self, _status: &str) {}
}

pub fn from_config(display: &Display) -> Arc<dyn DisplaySink> {
    if display.program.trim().is_empty() {
        Arc::new(NullSink)
    } else {
        Arc::new(CommandSink::new(display.program.clone(), display.args.clone()))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemorySink {
        published: Mutex<Vec<String>>,
    }

    impl MemorySink {
        pub fn published(&self) -> Vec<String> {
            self.published.lock().unwrap().clone()
        }
    }

    impl DisplaySink for MemorySink {
        fn publish(&self, status: &str) {
            self.published.lock().unwrap().push(status.to_string());
        }
    }
}
