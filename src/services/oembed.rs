//! TikTok oEmbed 查询
//!
//! 目录中找不到的 TikTok 视频，用 oEmbed 拿标题和封面拼一条临时记录。
//! 内置 Moka 缓存：同一 URL 的并发请求只发一次 HTTP，失败结果同样缓存。

use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tracing::{trace, warn};
use ureq::Agent;

use crate::config::OEmbedConfig;

const OEMBED_USER_AGENT: &str = "Mozilla/5.0";

/// oEmbed 响应中用到的字段
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OEmbedMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

pub struct OEmbedClient {
    endpoint: String,
    agent: Agent,
    /// 视频 URL → 元数据（None 为负缓存）
    cache: Cache<String, Option<OEmbedMeta>>,
}

impl OEmbedClient {
    pub fn new(config: &OEmbedConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs.max(1))))
            .build()
            .into();

        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(config.cache_ttl_secs.max(1)))
            .max_capacity(config.cache_capacity)
            .build();

        Self {
            endpoint: config.endpoint.clone(),
            agent,
            cache,
        }
    }

    /// `{endpoint}?url={encoded}`
    pub fn request_url(&self, video_url: &str) -> String {
        let sep = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}url={}",
            self.endpoint,
            sep,
            urlencoding::encode(video_url)
        )
    }

    /// 同步请求（在 spawn_blocking 中调用）
    fn fetch_sync(agent: Agent, url: String) -> Option<OEmbedMeta> {
        let resp = match agent
            .get(&url)
            .header("User-Agent", OEMBED_USER_AGENT)
            .call()
        {
            Ok(r) => r,
            Err(e) => {
                warn!("oEmbed request to \"{}\" failed: {}", url, e);
                return None;
            }
        };

        match resp.into_body().read_json::<OEmbedMeta>() {
            Ok(meta) => {
                trace!("oEmbed lookup ok: title={:?}", meta.title);
                Some(meta)
            }
            Err(e) => {
                warn!("oEmbed response from \"{}\" parse failed: {}", url, e);
                None
            }
        }
    }

    async fn fetch(&self, video_url: &str) -> Option<OEmbedMeta> {
        let url = self.request_url(video_url);
        let agent = self.agent.clone();

        tokio::task::spawn_blocking(move || Self::fetch_sync(agent, url))
            .await
            .unwrap_or_else(|e| {
                warn!("oEmbed spawn_blocking failed: {}", e);
                None
            })
    }

    /// 查询元数据（带缓存 + Singleflight）
    pub async fn lookup(&self, video_url: &str) -> Option<OEmbedMeta> {
        self.cache
            .get_with(video_url.to_string(), async {
                trace!("oEmbed cache miss for {}", video_url);
                self.fetch(video_url).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> OEmbedConfig {
        OEmbedConfig {
            // discard 端口，连接会被立即拒绝
            endpoint: "http://127.0.0.1:9/oembed".to_string(),
            timeout_secs: 1,
            cache_ttl_secs: 60,
            cache_capacity: 16,
        }
    }

    #[test]
    fn test_request_url_encodes_video_url() {
        let client = OEmbedClient::new(&OEmbedConfig::default());
        assert_eq!(
            client.request_url("https://www.tiktok.com/@a/video/1?lang=th"),
            "https://www.tiktok.com/oembed?url=https%3A%2F%2Fwww.tiktok.com%2F%40a%2Fvideo%2F1%3Flang%3Dth"
        );

        let client = OEmbedClient::new(&OEmbedConfig {
            endpoint: "https://proxy.example/oembed?format=json".to_string(),
            ..Default::default()
        });
        assert!(client.request_url("x").starts_with("https://proxy.example/oembed?format=json&url="));
    }

    #[test]
    fn test_meta_tolerates_missing_fields() {
        let meta: OEmbedMeta = serde_json::from_str(r#"{"version":"1.0","type":"video"}"#).unwrap();
        assert_eq!(meta, OEmbedMeta::default());
    }

    #[tokio::test]
    async fn test_failed_lookup_is_cached_as_miss() {
        let client = OEmbedClient::new(&unreachable_config());
        assert_eq!(client.lookup("https://www.tiktok.com/@a/video/1").await, None);
        assert!(client.cache.contains_key("https://www.tiktok.com/@a/video/1"));
    }
}
