//! Storage backend tests
//!
//! Tests for SeaOrmStorage and StorageProvider using temporary SQLite databases.

use chrono::{Duration, TimeZone, Utc};
use reviewhub::config::DatabaseConfig;
use reviewhub::storage::backend::infer_backend_from_url;
use reviewhub::storage::{
    NewReview, Platform, Review, ReviewFilter, ReviewPatch, SeaOrmStorage, StorageProvider,
};
use std::sync::Arc;
use tempfile::TempDir;

fn sqlite_config(dir: &TempDir) -> DatabaseConfig {
    DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display()),
        ..DatabaseConfig::default()
    }
}

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = SeaOrmStorage::new(&sqlite_config(&temp_dir))
        .await
        .expect("Failed to create storage");
    (storage, temp_dir)
}

fn new_review(title: &str, days_ago: i64) -> NewReview {
    NewReview {
        title: title.to_string(),
        platform: Platform::Tiktok,
        product_image: None,
        product_gif: None,
        price: None,
        rating: None,
        tags: Vec::new(),
        aliases: Vec::new(),
        published_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap() - Duration::days(days_ago),
        review_url: format!("https://www.tiktok.com/@shop/video/{}", days_ago),
        affiliate_url: String::new(),
        pros: Vec::new(),
        cons: Vec::new(),
    }
}

/// 按 reviewUrl 取回单条记录（测试数据的 reviewUrl 互不相同）
async fn fetch(storage: &SeaOrmStorage, review: &Review) -> Option<Review> {
    let filter = ReviewFilter {
        review_url: Some(review.review_url.clone()),
        ..ReviewFilter::default()
    };
    storage
        .find(&filter, 1)
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.id == review.id)
}

#[cfg(test)]
mod url_inference_tests {
    use super::*;

    #[test]
    fn test_infer_backends() {
        assert_eq!(infer_backend_from_url("sqlite://reviews.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("data/reviews.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mysql://u:p@h/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("mariadb://u:p@h/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("postgres://u:p@h/db").unwrap(), "postgres");
        assert!(infer_backend_from_url("redis://localhost").is_err());
    }
}

#[cfg(test)]
mod crud_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let (storage, _dir) = create_temp_storage().await;

        let mut input = new_review("Lip tint", 0);
        input.tags = vec!["makeup".to_string()];
        input.rating = Some(4.5);
        let review = storage.insert(input).await.unwrap();

        assert!(uuid::Uuid::parse_str(&review.id).is_ok());
        assert!(review.created_at.is_some());
        assert_eq!(review.created_at, review.updated_at);

        let fetched = fetch(&storage, &review).await.unwrap();
        assert_eq!(fetched.title, "Lip tint");
        assert_eq!(fetched.tags, vec!["makeup"]);
        assert_eq!(fetched.rating, Some(4.5));
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let (storage, _dir) = create_temp_storage().await;

        let mut input = new_review("Sunscreen", 0);
        input.price = Some("฿299".to_string());
        let review = storage.insert(input).await.unwrap();

        let patch = ReviewPatch {
            title: Some("Sunscreen SPF50".to_string()),
            tags: Some(vec!["skincare".to_string()]),
            ..ReviewPatch::default()
        };
        assert!(storage.update(&review.id, patch).await.unwrap());

        let fetched = fetch(&storage, &review).await.unwrap();
        assert_eq!(fetched.title, "Sunscreen SPF50");
        assert_eq!(fetched.tags, vec!["skincare"]);
        assert_eq!(fetched.price.as_deref(), Some("฿299"));
        assert!(fetched.updated_at >= review.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_return_false() {
        let (storage, _dir) = create_temp_storage().await;
        let missing = uuid::Uuid::new_v4().to_string();

        let patch = ReviewPatch {
            title: Some("x".to_string()),
            ..ReviewPatch::default()
        };
        assert!(!storage.update(&missing, patch).await.unwrap());
        assert!(!storage.delete(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let (storage, _dir) = create_temp_storage().await;
        let review = storage.insert(new_review("Serum", 0)).await.unwrap();

        assert!(storage.delete(&review.id).await.unwrap());
        assert!(fetch(&storage, &review).await.is_none());
        assert_eq!(storage.count().await.unwrap(), 0);
    }
}

#[cfg(test)]
mod find_tests {
    use super::*;

    async fn seeded() -> (SeaOrmStorage, TempDir) {
        let (storage, dir) = create_temp_storage().await;

        let mut a = new_review("Matte Lipstick", 3);
        a.tags = vec!["makeup".to_string(), "lips".to_string()];
        a.aliases = vec!["ลิปแมท".to_string()];

        let mut b = new_review("Cushion Foundation", 1);
        b.tags = vec!["makeup".to_string(), "face".to_string()];

        let mut c = new_review("Rice Cooker", 2);
        c.tags = vec!["kitchen".to_string()];
        c.aliases = vec!["หม้อหุงข้าว".to_string()];

        for r in [a, b, c] {
            storage.insert(r).await.unwrap();
        }
        (storage, dir)
    }

    #[tokio::test]
    async fn test_sorted_by_published_desc() {
        let (storage, _dir) = seeded().await;
        let all = storage.find(&ReviewFilter::default(), 36).await.unwrap();
        let titles: Vec<_> = all.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Cushion Foundation", "Rice Cooker", "Matte Lipstick"]);
    }

    #[tokio::test]
    async fn test_limit() {
        let (storage, _dir) = seeded().await;
        let top = storage.find(&ReviewFilter::default(), 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].title, "Cushion Foundation");

        let filter = ReviewFilter {
            tags: vec!["makeup".to_string()],
            ..ReviewFilter::default()
        };
        let top = storage.find(&filter, 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].title, "Cushion Foundation");
    }

    #[tokio::test]
    async fn test_text_matches_title_alias_and_tag() {
        let (storage, _dir) = seeded().await;

        let by_title = ReviewFilter {
            text: Some("LIPSTICK".to_string()),
            ..ReviewFilter::default()
        };
        assert_eq!(storage.find(&by_title, 36).await.unwrap().len(), 1);

        let by_alias = ReviewFilter {
            text: Some("หม้อ".to_string()),
            ..ReviewFilter::default()
        };
        let hits = storage.find(&by_alias, 36).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rice Cooker");

        let by_tag = ReviewFilter {
            text: Some("fac".to_string()),
            ..ReviewFilter::default()
        };
        let hits = storage.find(&by_tag, 36).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Cushion Foundation");
    }

    #[tokio::test]
    async fn test_like_wildcards_are_literal() {
        let (storage, _dir) = seeded().await;
        let mut promo = new_review("Serum 50% off_today", 0);
        promo.tags = vec!["sale_50%".to_string()];
        storage.insert(promo).await.unwrap();

        for text in ["50%", "%", "_", "OFF_TODAY"] {
            let filter = ReviewFilter {
                text: Some(text.to_string()),
                ..ReviewFilter::default()
            };
            let hits = storage.find(&filter, 36).await.unwrap();
            assert_eq!(hits.len(), 1, "{}", text);
            assert_eq!(hits[0].title, "Serum 50% off_today");
        }

        let filter = ReviewFilter {
            tags: vec!["sale_50%".to_string()],
            ..ReviewFilter::default()
        };
        assert_eq!(storage.find(&filter, 36).await.unwrap().len(), 1);

        let filter = ReviewFilter {
            tags: vec!["sale%".to_string()],
            ..ReviewFilter::default()
        };
        assert!(storage.find(&filter, 36).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_with_quotes_still_matches() {
        let (storage, _dir) = seeded().await;
        let mut quoted = new_review("The \"best\" blender", 0);
        quoted.aliases = vec!["blender \"pro\"".to_string()];
        storage.insert(quoted).await.unwrap();

        let filter = ReviewFilter {
            text: Some("\"PRO\"".to_string()),
            ..ReviewFilter::default()
        };
        let hits = storage.find(&filter, 36).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "The \"best\" blender");
    }

    #[tokio::test]
    async fn test_tags_require_all() {
        let (storage, _dir) = seeded().await;

        let filter = ReviewFilter {
            tags: vec!["makeup".to_string(), "lips".to_string()],
            ..ReviewFilter::default()
        };
        let hits = storage.find(&filter, 36).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Matte Lipstick");

        // 标签是精确匹配
        let filter = ReviewFilter {
            tags: vec!["make".to_string()],
            ..ReviewFilter::default()
        };
        assert!(storage.find(&filter, 36).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_url_exact() {
        let (storage, _dir) = seeded().await;

        let filter = ReviewFilter {
            review_url: Some("https://www.tiktok.com/@shop/video/2".to_string()),
            ..ReviewFilter::default()
        };
        let hits = storage.find(&filter, 36).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rice Cooker");
    }
}

#[cfg(test)]
mod provider_tests {
    use super::*;

    #[tokio::test]
    async fn test_provider_connects_lazily_once() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(StorageProvider::new(sqlite_config(&dir)));
        assert!(!provider.is_connected());

        let (a, b) = tokio::join!(provider.get(), provider.get());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(provider.is_connected());
    }

    #[tokio::test]
    async fn test_provider_retries_after_failure() {
        let dir = TempDir::new().unwrap();
        let missing_dir = dir.path().join("not-yet");
        let config = DatabaseConfig {
            database_url: format!("sqlite://{}?mode=rwc", missing_dir.join("r.db").display()),
            ..DatabaseConfig::default()
        };
        let provider = StorageProvider::new(config);

        assert!(provider.get().await.is_err());
        assert!(!provider.is_connected());

        std::fs::create_dir_all(&missing_dir).unwrap();
        assert!(provider.get().await.is_ok());
        assert!(provider.is_connected());
    }
}
