use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 视频来源平台
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Tiktok,
    Youtube,
    Reels,
}

/// 对外返回的评测记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_gif: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub review_url: String,
    #[serde(default)]
    pub affiliate_url: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    /// oEmbed 临时记录没有存储时间戳
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 新建评测（已通过校验）
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub title: String,
    pub platform: Platform,
    pub product_image: Option<String>,
    pub product_gif: Option<String>,
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub tags: Vec<String>,
    pub aliases: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub review_url: String,
    pub affiliate_url: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// 部分更新，`None` 表示不修改
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPatch {
    pub title: Option<String>,
    pub platform: Option<Platform>,
    pub product_image: Option<String>,
    pub product_gif: Option<String>,
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub aliases: Option<Vec<String>>,
    pub published_at: Option<DateTime<Utc>>,
    pub review_url: Option<String>,
    pub affiliate_url: Option<String>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
}

/// 目录查询条件
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    /// 标题、别名、标签的不区分大小写子串匹配
    pub text: Option<String>,
    /// 必须全部包含（精确匹配）
    pub tags: Vec<String>,
    /// reviewUrl 精确匹配
    pub review_url: Option<String>,
}

impl ReviewFilter {
    /// 是否需要在 SQL 之外再做过滤
    pub fn needs_post_filter(&self) -> bool {
        self.text.is_some() || !self.tags.is_empty()
    }

    pub fn matches(&self, review: &Review) -> bool {
        if !self.tags.iter().all(|t| review.tags.contains(t)) {
            return false;
        }

        match self.text.as_deref() {
            None => true,
            Some(text) => {
                let needle = text.to_lowercase();
                let hit = |s: &String| s.to_lowercase().contains(&needle);
                hit(&review.title) || review.aliases.iter().any(hit) || review.tags.iter().any(hit)
            }
        }
    }
}
