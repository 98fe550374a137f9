//! Review catalog storage
//!
//! `StorageProvider` is built at startup and injected into every handler.
//! The database connection is opened lazily on first use.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{NewReview, Platform, Review, ReviewFilter, ReviewPatch};

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let storage = SeaOrmStorage::new(config).await?;
        Ok(Arc::new(storage))
    }
}

/// 惰性连接的存储句柄
///
/// 并发的首次请求共享同一次连接尝试；连接失败不会被缓存，
/// 下一个请求会重新尝试。
pub struct StorageProvider {
    config: DatabaseConfig,
    cell: OnceCell<Arc<SeaOrmStorage>>,
}

impl StorageProvider {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// 使用已连接的存储（测试、预热）
    pub fn with_storage(config: DatabaseConfig, storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            config,
            cell: OnceCell::new_with(Some(storage)),
        }
    }

    pub async fn get(&self) -> Result<Arc<SeaOrmStorage>> {
        self.cell
            .get_or_try_init(|| async {
                info!("Opening review storage");
                StorageFactory::create(&self.config).await.inspect_err(|e| {
                    error!("Review storage unavailable: {}", e);
                })
            })
            .await
            .cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_config(path: &std::path::Path) -> DatabaseConfig {
        DatabaseConfig {
            database_url: format!("sqlite://{}?mode=rwc", path.display()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_provider_connects_once_and_shares_handle() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(StorageProvider::new(sqlite_config(&dir.path().join("r.db"))));
        assert!(!provider.is_connected());

        let (a, b) = tokio::join!(provider.get(), provider.get());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(provider.is_connected());
    }

    #[tokio::test]
    async fn test_failed_connect_is_not_cached() {
        let provider = StorageProvider::new(DatabaseConfig {
            database_url: "unsupported://nowhere".to_string(),
            ..Default::default()
        });

        assert!(provider.get().await.is_err());
        assert!(!provider.is_connected());
        assert!(provider.get().await.is_err());
    }
}
