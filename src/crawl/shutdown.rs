// src/crawl/shutdown.rs
// =============================================================================
// A stop signal shared by the driver, the workers and every blocking call.
//
// Built on tokio's watch channel: one boolean that starts false and flips to
// true exactly once. Any clone can trigger it and any clone can wait for it.
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable shutdown handle
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// Ask everything holding a clone to stop
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once `trigger` has been called
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives in self, so this only returns Err if it was dropped
        let _ = receiver.wait_for(|stopped| *stopped).await;
    }

    /// Run a future until it finishes or shutdown is triggered
    ///
    /// Returns None when shutdown won. Shutdown is checked first, so an
    /// already-triggered signal never lets new work start.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
