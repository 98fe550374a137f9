//! Query operations for SeaOrmStorage

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, ExprTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::{debug, warn};

use super::converters::model_to_review;
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ReviewHubError};
use crate::storage::models::{Review, ReviewFilter};

use migration::entities::review;

impl SeaOrmStorage {
    /// 按条件查询，`publishedAt` 倒序，最多 `limit` 条
    ///
    /// `review_url` 在 SQL 中精确过滤。文本和标签条件先用 `LIKE` 在 SQL 中
    /// 预筛选（JSON 文本列，结果是真实匹配的超集），再在内存中精确匹配。
    pub async fn find(&self, filter: &ReviewFilter, limit: u64) -> Result<Vec<Review>> {
        let db = &self.db;
        let post_filter = filter.needs_post_filter();
        let condition = prefilter(filter);

        let models = retry::with_retry("find", self.retry_config, || async {
            let mut query = review::Entity::find().filter(condition.clone());
            query = query
                .order_by_desc(review::Column::PublishedAt)
                .order_by_desc(review::Column::CreatedAt);
            if !post_filter {
                query = query.limit(limit);
            }
            query.all(db).await
        })
        .await
        .map_err(|e| ReviewHubError::database_operation(format!("查询评测失败: {}", e)))?;

        let scanned = models.len();
        let reviews: Vec<Review> = models
            .into_iter()
            .filter_map(|m| {
                model_to_review(m)
                    .map_err(|e| warn!("skipping unreadable row: {}", e))
                    .ok()
            })
            .filter(|r| !post_filter || filter.matches(r))
            .take(limit as usize)
            .collect();

        debug!(
            "find: scanned {} rows, returning {} (limit {})",
            scanned,
            reviews.len(),
            limit
        );
        Ok(reviews)
    }

    /// 评测总数（健康检查）
    pub async fn count(&self) -> Result<u64> {
        let db = &self.db;
        retry::with_retry("count", self.retry_config, || async {
            review::Entity::find().count(db).await
        })
        .await
        .map_err(|e| ReviewHubError::database_operation(format!("统计评测失败: {}", e)))
    }
}

const LIKE_ESCAPE: char = '!';

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    for c in raw.chars() {
        if matches!(c, '!' | '%' | '_') {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

fn contains_like(needle: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(needle))).escape(LIKE_ESCAPE)
}

/// JSON 编码前后一致的文本（没有引号、反斜杠、控制字符）
fn is_json_plain(s: &str) -> bool {
    !s.chars().any(|c| c == '"' || c == '\\' || c.is_control())
}

/// `find` 的 SQL 预筛选条件
///
/// 只放入能保证不漏掉结果的条件：非 ASCII 文本的大小写折叠在各数据库不一致，
/// 需要 JSON 转义的值在列中的形式不同，这两类只在内存中匹配。
pub(crate) fn prefilter(filter: &ReviewFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(ref url) = filter.review_url {
        condition = condition.add(review::Column::ReviewUrl.eq(url.as_str()));
    }

    let pushable_text = filter
        .text
        .as_deref()
        .filter(|t| t.is_ascii() && is_json_plain(t));
    if let Some(text) = pushable_text {
        let needle = text.to_ascii_lowercase();
        let lower_like = |col: review::Column| {
            Expr::expr(Func::lower(Expr::col(col))).like(contains_like(&needle))
        };
        condition = condition.add(
            Condition::any()
                .add(lower_like(review::Column::Title))
                .add(lower_like(review::Column::Aliases))
                .add(lower_like(review::Column::Tags)),
        );
    }

    for tag in filter.tags.iter().filter(|t| is_json_plain(t)) {
        let quoted = format!("\"{}\"", tag);
        condition = condition.add(review::Column::Tags.like(contains_like(&quoted)));
    }

    condition
}
