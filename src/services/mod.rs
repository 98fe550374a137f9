//! Domain services
//!
//! - `link_resolver` / `tiktok` / `interstitial`: `/go` 出站跳转
//! - `review_input`: 写入参数解析
//! - `search` / `oembed`: 目录搜索

pub mod interstitial;
pub mod link_resolver;
pub mod oembed;
pub mod review_input;
pub mod search;
pub mod tiktok;

pub use link_resolver::{InAppDetector, Interstitial, LinkResolver, Resolution, ResolveFailure};
pub use oembed::{OEmbedClient, OEmbedMeta};
pub use review_input::{ValidationErrors, parse_new_review, parse_review_patch};
pub use search::{CachePolicy, SearchOutcome, SearchQuery};
