use std::future::Future;
use std::io;
use tracing::{error, info};

/// Resolves on Ctrl+C or SIGTERM, whichever comes first
pub async fn shutdown_signal() {
    let ctrl_c = until_signal("Ctrl+C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = until_signal("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Waits for a signal listener. A listener that cannot be installed never
/// resolves, so the server keeps running on the remaining ones.
pub async fn until_signal<F>(name: &str, listener: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = listener.await {
        error!("Failed to listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_failed_listener_never_resolves() {
        let failed = until_signal("SIGTERM", async { Err::<(), _>(io::Error::other("unsupported")) });

        let result = tokio::time::timeout(Duration::from_secs(3600), failed).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_received_signal_resolves() {
        let received = until_signal("SIGTERM", async { Ok::<(), io::Error>(()) });

        tokio::time::timeout(Duration::from_secs(1), received)
            .await
            .unwrap();
    }
}
