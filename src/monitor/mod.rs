//! Background monitoring schedulers.
//!
//! Three independent cooperative loops: event discovery, price-alert
//! evaluation, and watchlist context-change detection. Each runs on its
//! own timer, talks to the gateway/store/dispatcher it was constructed
//! with, and never calls the other two. No error inside a polling cycle
//! terminates a loop; only an explicit stop does.

mod alerts;
mod context;
mod discovery;

pub use alerts::AlertMonitor;
pub use context::ContextMonitor;
pub use discovery::EventDiscoveryMonitor;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Handle to a running monitor loop.
///
/// Dropping the handle leaves the loop running; call [`stop`] to cancel
/// the pending wait and join the task. In-flight network calls finish or
/// time out on their own.
///
/// [`stop`]: MonitorHandle::stop
pub struct MonitorHandle {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    fn new(name: &'static str, shutdown: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
        Self {
            name,
            shutdown,
            task,
        }
    }

    /// Signal the loop to exit and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(monitor = self.name, error = %e, "Monitor task failed to join");
        }
        info!(monitor = self.name, "Monitor stopped");
    }
}
