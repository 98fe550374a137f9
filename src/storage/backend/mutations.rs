//! Mutation operations for SeaOrmStorage

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::info;

use super::converters::{new_review_to_active_model, patch_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ReviewHubError};
use crate::storage::models::{NewReview, Review, ReviewPatch};

use migration::entities::review;

impl SeaOrmStorage {
    /// 插入新评测，分配 UUID v4
    pub async fn insert(&self, input: NewReview) -> Result<Review> {
        let db = &self.db;
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let active_model = new_review_to_active_model(&id, &input, now);

        retry::with_retry(&format!("insert({})", id), self.retry_config, || {
            let am = active_model.clone();
            async move { review::Entity::insert(am).exec(db).await.map(|_| ()) }
        })
        .await
        .map_err(|e| ReviewHubError::database_operation(format!("写入评测失败: {}", e)))?;

        info!("Review created: {} ({})", id, input.title);

        Ok(Review {
            id,
            title: input.title,
            platform: input.platform,
            product_image: input.product_image,
            product_gif: input.product_gif,
            price: input.price,
            rating: input.rating,
            tags: input.tags,
            aliases: input.aliases,
            published_at: input.published_at,
            review_url: input.review_url,
            affiliate_url: input.affiliate_url,
            pros: input.pros,
            cons: input.cons,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    /// 部分更新；没有匹配行时返回 false
    pub async fn update(&self, id: &str, patch: ReviewPatch) -> Result<bool> {
        let db = &self.db;
        let id_owned = id.to_string();
        let active_model = patch_to_active_model(&patch, Utc::now());

        let result = retry::with_retry(&format!("update({})", id), self.retry_config, || {
            let am = active_model.clone();
            let id = id_owned.clone();
            async move {
                review::Entity::update_many()
                    .set(am)
                    .filter(review::Column::Id.eq(id))
                    .exec(db)
                    .await
            }
        })
        .await
        .map_err(|e| ReviewHubError::database_operation(format!("更新评测失败: {}", e)))?;

        let matched = result.rows_affected > 0;
        if matched {
            info!("Review updated: {}", id);
        }
        Ok(matched)
    }

    /// 删除；没有匹配行时返回 false
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let db = &self.db;
        let id_owned = id.to_string();

        let result = retry::with_retry(&format!("delete({})", id), self.retry_config, || async {
            review::Entity::delete_by_id(id_owned.clone()).exec(db).await
        })
        .await
        .map_err(|e| ReviewHubError::database_operation(format!("删除评测失败: {}", e)))?;

        let matched = result.rows_affected > 0;
        if matched {
            info!("Review deleted: {}", id);
        }
        Ok(matched)
    }
}
