use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::storage::StorageProvider;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        let mut term = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.", e);
                }
                return;
            }
        };
        tokio::select! {
            res = signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!("Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.", e);
                }
            }
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    if let Err(e) = signal::ctrl_c().await {
        warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        );
    }
}

pub async fn listen_for_shutdown(storage: Arc<StorageProvider>) {
    wait_for_signal().await;
    info!("Shutdown signal received");

    match timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        perform_shutdown_tasks(storage),
    )
    .await
    {
        Ok(()) => info!("All shutdown tasks completed successfully"),
        Err(_) => error!(
            "Shutdown tasks timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}

async fn perform_shutdown_tasks(storage: Arc<StorageProvider>) {
    if !storage.is_connected() {
        info!("Database was never connected, nothing to close");
        return;
    }

    // 连接池在最后一个引用释放时关闭
    match storage.get().await {
        Ok(s) => info!("Releasing {} connection pool", s.backend_name()),
        Err(e) => error!("Storage unavailable during shutdown: {}", e),
    }
}
