use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::session::get_session_service;
use crate::config::StaticConfig;
use crate::services::{LinkResolver, OEmbedClient};
use crate::storage::StorageProvider;
use crate::storage::backend::infer_backend_from_url;

/// 服务器共享组件
pub struct StartupContext {
    pub storage: Arc<StorageProvider>,
    pub resolver: Arc<LinkResolver>,
    pub oembed: Arc<OEmbedClient>,
}

/// 准备服务器启动的上下文
///
/// 数据库在第一次请求时才连接，这里只校验连接串能识别出后端。
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let backend = infer_backend_from_url(&config.database.database_url)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Invalid database.database_url")?;
    info!("Using storage backend: {} (connects on first use)", backend);

    let storage = Arc::new(StorageProvider::new(config.database.clone()));

    if config.auth.admin_password.is_empty() {
        warn!("auth.admin_password is not set, admin login is disabled");
    }
    if config.auth.admin_token.is_empty() {
        debug!("auth.admin_token is not set, bearer writes are disabled");
    }
    // 提前初始化，随机密钥的告警在启动时输出
    let _ = get_session_service();

    let resolver = Arc::new(LinkResolver::new(&config.resolver.extra_in_app_signatures));
    if !config.resolver.extra_in_app_signatures.is_empty() {
        info!(
            "Extra in-app signatures: {:?}",
            config.resolver.extra_in_app_signatures
        );
    }

    let oembed = Arc::new(OEmbedClient::new(&config.oembed));

    debug!("Pre-startup completed in {:?}", start_time.elapsed());

    Ok(StartupContext {
        storage,
        resolver,
        oembed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_unknown_database_url() {
        let mut config = StaticConfig::default();
        config.database.database_url = "redis://localhost".to_string();
        crate::config::init_config_with(config.clone());
        assert!(prepare_server_startup(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_storage_is_lazy() {
        let mut config = StaticConfig::default();
        config.database.database_url = "sqlite::memory:".to_string();
        crate::config::init_config_with(config.clone());
        let ctx = prepare_server_startup(&config).await.unwrap();
        assert!(!ctx.storage.is_connected());
    }
}
