use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use tracing::warn;

use crate::errors::{Result, ReviewHubError};
use crate::storage::models::{NewReview, Platform, Review, ReviewPatch};
use migration::entities::review;

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// 损坏的列表字段按空列表处理
fn decode_list(id: &str, column: &str, raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("review {}: column {} is not a JSON string array: {}", id, column, e);
        Vec::new()
    })
}

/// 将 Sea-ORM Model 转换为 Review
pub fn model_to_review(model: review::Model) -> Result<Review> {
    let platform = Platform::from_str(&model.platform).map_err(|_| {
        ReviewHubError::serialization(format!(
            "review {}: unknown platform '{}'",
            model.id, model.platform
        ))
    })?;

    Ok(Review {
        tags: decode_list(&model.id, "tags", &model.tags),
        aliases: decode_list(&model.id, "aliases", &model.aliases),
        pros: decode_list(&model.id, "pros", &model.pros),
        cons: decode_list(&model.id, "cons", &model.cons),
        id: model.id,
        title: model.title,
        platform,
        product_image: model.product_image,
        product_gif: model.product_gif,
        price: model.price,
        rating: model.rating,
        published_at: model.published_at,
        review_url: model.review_url,
        affiliate_url: model.affiliate_url,
        created_at: Some(model.created_at),
        updated_at: Some(model.updated_at),
    })
}

/// 新建记录的 ActiveModel
pub fn new_review_to_active_model(
    id: &str,
    input: &NewReview,
    now: DateTime<Utc>,
) -> review::ActiveModel {
    review::ActiveModel {
        id: Set(id.to_string()),
        title: Set(input.title.clone()),
        platform: Set(input.platform.to_string()),
        product_image: Set(input.product_image.clone()),
        product_gif: Set(input.product_gif.clone()),
        price: Set(input.price.clone()),
        rating: Set(input.rating),
        tags: Set(encode_list(&input.tags)),
        aliases: Set(encode_list(&input.aliases)),
        published_at: Set(input.published_at),
        review_url: Set(input.review_url.clone()),
        affiliate_url: Set(input.affiliate_url.clone()),
        pros: Set(encode_list(&input.pros)),
        cons: Set(encode_list(&input.cons)),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// 部分更新的 ActiveModel，未提供的字段保持 NotSet
pub fn patch_to_active_model(patch: &ReviewPatch, now: DateTime<Utc>) -> review::ActiveModel {
    fn opt<T: Clone + Into<sea_orm::Value>>(v: &Option<T>) -> sea_orm::ActiveValue<T> {
        match v {
            Some(v) => Set(v.clone()),
            None => NotSet,
        }
    }
    fn opt_some<T: Clone>(v: &Option<T>) -> sea_orm::ActiveValue<Option<T>>
    where
        Option<T>: Into<sea_orm::Value>,
    {
        match v {
            Some(v) => Set(Some(v.clone())),
            None => NotSet,
        }
    }
    fn opt_list(v: &Option<Vec<String>>) -> sea_orm::ActiveValue<String> {
        match v {
            Some(items) => Set(encode_list(items)),
            None => NotSet,
        }
    }

    review::ActiveModel {
        id: NotSet,
        title: opt(&patch.title),
        platform: match patch.platform {
            Some(p) => Set(p.to_string()),
            None => NotSet,
        },
        product_image: opt_some(&patch.product_image),
        product_gif: opt_some(&patch.product_gif),
        price: opt_some(&patch.price),
        rating: opt_some(&patch.rating),
        tags: opt_list(&patch.tags),
        aliases: opt_list(&patch.aliases),
        published_at: opt(&patch.published_at),
        review_url: opt(&patch.review_url),
        affiliate_url: opt(&patch.affiliate_url),
        pros: opt_list(&patch.pros),
        cons: opt_list(&patch.cons),
        created_at: NotSet,
        updated_at: Set(now),
    }
}
