//! Update manager for scheduling read cycles

use super::host::{CycleSummary, PluginHost};
use anyhow::Result;
use log::{info, trace, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Drives read cycles at a fixed interval, one at a time
pub struct UpdateManager {
    host: Arc<PluginHost>,
    interval: Duration,
}

impl UpdateManager {
    /// Create a new update manager
    pub fn new(host: PluginHost, interval: Duration) -> Self {
        Self {
            host: Arc::new(host),
            interval,
        }
    }

    /// Run a single read cycle
    ///
    /// Plugins block on their subprocesses, so the cycle runs on the blocking
    /// pool; the caller still waits for it to finish.
    pub async fn run_once(&self) -> Result<CycleSummary> {
        let host = Arc::clone(&self.host);
        let start = Instant::now();

        let summary = tokio::task::spawn_blocking(move || host.read_all()).await?;

        trace!("Read cycle took {:?}", start.elapsed());
        if !summary.failed.is_empty() {
            warn!(
                "Read cycle finished with {} failed plugin(s): {}",
                summary.failed.len(),
                summary.failed.join(", ")
            );
        }
        Ok(summary)
    }

    /// Start the update loop
    ///
    /// Runs until Ctrl-C. A cycle that overruns the interval delays the next
    /// tick instead of triggering a burst of catch-up cycles.
    pub async fn run(&self) -> Result<()> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// Run the update loop until `shutdown` completes
    ///
    /// Shutdown is observed during a read cycle too. The interrupted cycle
    /// finishes on the blocking pool but its result is discarded.
    pub async fn run_until<F: Future>(&self, shutdown: F) -> Result<()> {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Reading {} plugin(s) every {:?}",
            self.host.read_plugin_count(),
            self.interval
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown => {
                    info!("Interrupted, shutting down");
                    return Ok(());
                }
            }

            tokio::select! {
                result = self.run_once() => {
                    result?;
                }
                _ = &mut shutdown => {
                    info!("Interrupted during a read cycle, shutting down");
                    return Ok(());
                }
            }
        }
    }
}
