//! Graceful shutdown on SIGINT/SIGTERM.

use tokio::signal;
use tokio::sync::watch;

/// Broadcasts a one-shot shutdown signal to every subscriber.
///
/// Backed by a `watch` channel so late subscribers still observe a shutdown
/// that already happened.
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Future that resolves once shutdown has been triggered.
    pub fn signalled(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            while !*rx.borrow_and_update() {
                // Controller dropped: nobody can signal any more.
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    /// Wait for SIGINT or SIGTERM, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
            _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn programmatic_shutdown_resolves_waiters() {
        let controller = ShutdownController::new();
        let waiter = tokio::spawn(controller.signalled());
        controller.shutdown();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn late_subscriber_sees_past_shutdown() {
        let controller = ShutdownController::new();
        controller.shutdown();
        controller.signalled().await;
    }
}
