//! HTTP Episode Store - 调用剧集后端 HTTP API
//!
//! 实现 EpisodeStorePort trait
//!
//! 后端 API:
//! - POST   {base}/api/story/submit         {story_text, character_name?, character_appearance?}
//! - GET    {base}/api/episodes
//! - GET    {base}/api/episodes/{id}
//! - DELETE {base}/api/episodes/{id}
//! - POST   {base}/api/panels/generate      {episode_id, panel_id} -> {image_base64, status}
//! - GET    {base}/api/health
//!
//! 失败响应体为 {"detail": "..."}

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::wire::{EpisodeWire, GeneratePanelBody, PanelImageWire};
use crate::application::ports::{EpisodeStorePort, PanelImage, StoreError, StoreOperation};
use crate::domain::{Episode, EpisodeId, PanelId, StorySubmission};

/// 本地开发后端地址
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8003";

/// HTTP 客户端配置
///
/// 创建后不可修改；base_url 在构造时注入
#[derive(Debug, Clone)]
pub struct HttpEpisodeStoreConfig {
    /// 后端基础 URL
    pub base_url: String,
    /// 普通读写请求的等待上限
    pub request_timeout: Duration,
    /// 提交故事的等待上限
    pub submit_timeout: Duration,
    /// 生成分格图片的等待上限
    pub generate_timeout: Duration,
    /// 健康探测的等待上限
    pub health_timeout: Duration,
    /// 提交故事前是否发出后台健康探测
    pub probe_before_submit: bool,
}

impl Default for HttpEpisodeStoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            submit_timeout: Duration::from_secs(60),
            generate_timeout: Duration::from_secs(90),
            health_timeout: Duration::from_secs(5),
            probe_before_submit: true,
        }
    }
}

impl HttpEpisodeStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    pub fn with_generate_timeout(mut self, timeout: Duration) -> Self {
        self.generate_timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn with_probe_before_submit(mut self, enabled: bool) -> Self {
        self.probe_before_submit = enabled;
        self
    }
}

/// HTTP 剧集后端客户端
pub struct HttpEpisodeStore {
    client: Client,
    config: HttpEpisodeStoreConfig,
}

impl HttpEpisodeStore {
    pub fn new(mut config: HttpEpisodeStoreConfig) -> Result<Self, StoreError> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.base_url, path)
    }

    fn episode_url(&self, episode_id: &EpisodeId) -> String {
        self.url(&format!("/episodes/{}", episode_id))
    }

    /// 发送请求并按状态码分类错误
    ///
    /// resource 为 Some 时 404 视为 NotFound，否则视为 Server
    async fn send(
        &self,
        operation: StoreOperation,
        request: RequestBuilder,
        timeout: Duration,
        resource: Option<&str>,
    ) -> Result<Response, StoreError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(operation, timeout, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(operation = %operation, error = %e, "Failed to read error body");
                String::new()
            }
        };
        let detail = extract_detail(status, &body);

        tracing::warn!(
            operation = %operation,
            status = status.as_u16(),
            detail = %detail,
            "Backend returned an error"
        );

        match (status, resource) {
            (StatusCode::NOT_FOUND, Some(resource)) => {
                Err(StoreError::NotFound(format!("{}: {}", resource, detail)))
            }
            _ => Err(StoreError::Server {
                status: status.as_u16(),
                detail,
            }),
        }
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        operation: StoreOperation,
        response: Response,
        timeout: Duration,
    ) -> Result<T, StoreError> {
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(operation, timeout, e))?;

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Server {
            status,
            detail: format!("malformed response: {}", e),
        })
    }

    async fn fetch_episode(
        &self,
        operation: StoreOperation,
        response: Response,
        timeout: Duration,
    ) -> Result<Episode, StoreError> {
        let status = response.status().as_u16();
        let wire: EpisodeWire = self.read_json(operation, response, timeout).await?;
        wire.into_episode(Utc::now())
            .map_err(|detail| malformed(status, detail))
    }

    /// 后台健康探测，不阻塞也不影响主请求
    fn spawn_health_probe(&self) {
        let client = self.client.clone();
        let url = self.url("/health");
        let timeout = self.config.health_timeout;

        tokio::spawn(async move {
            match client.get(&url).timeout(timeout).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Backend health probe ok");
                }
                Ok(response) => {
                    tracing::warn!(
                        status = response.status().as_u16(),
                        "Backend health probe failed, it may be cold-starting"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Backend health probe failed, it may be cold-starting");
                }
            }
        });
    }
}

fn malformed(status: u16, detail: String) -> StoreError {
    StoreError::Server {
        status,
        detail: format!("malformed response: {}", detail),
    }
}

/// 将传输层错误归类为 Timeout 或 Network
fn classify_transport_error(
    operation: StoreOperation,
    after: Duration,
    error: reqwest::Error,
) -> StoreError {
    if error.is_timeout() {
        StoreError::Timeout { operation, after }
    } else if error.is_connect() {
        StoreError::Network(format!("Cannot connect to backend: {}", error))
    } else {
        StoreError::Network(error.to_string())
    }
}

/// 提取后端提供的错误详情
///
/// 优先使用 JSON 的 detail 字段，其次为原始文本，最后为状态码说明
fn extract_detail(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        match json.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

#[async_trait]
impl EpisodeStorePort for HttpEpisodeStore {
    async fn submit_story(&self, submission: StorySubmission) -> Result<Episode, StoreError> {
        let operation = StoreOperation::SubmitStory;
        let timeout = self.config.submit_timeout;

        if self.config.probe_before_submit {
            self.spawn_health_probe();
        }

        tracing::debug!(
            url = %self.url("/story/submit"),
            story_len = submission.story_text().len(),
            "Submitting story"
        );

        let request = self.client.post(self.url("/story/submit")).json(&submission);
        let response = self.send(operation, request, timeout, None).await?;
        let episode = self.fetch_episode(operation, response, timeout).await?;

        tracing::info!(
            episode_id = %episode.episode_id(),
            title = %episode.title(),
            panels = episode.panel_count(),
            "Episode created"
        );

        Ok(episode)
    }

    async fn get_episode(&self, episode_id: &EpisodeId) -> Result<Episode, StoreError> {
        let operation = StoreOperation::GetEpisode;
        let timeout = self.config.request_timeout;

        let request = self.client.get(self.episode_url(episode_id));
        let response = self
            .send(operation, request, timeout, Some(episode_id.as_str()))
            .await?;
        let episode = self.fetch_episode(operation, response, timeout).await?;

        tracing::debug!(
            episode_id = %episode_id,
            panels = episode.panel_count(),
            "Episode fetched"
        );

        Ok(episode)
    }

    async fn list_episodes(&self) -> Result<Vec<Episode>, StoreError> {
        let operation = StoreOperation::ListEpisodes;
        let timeout = self.config.request_timeout;

        let request = self.client.get(self.url("/episodes"));
        let response = self.send(operation, request, timeout, None).await?;
        let status = response.status().as_u16();
        let wires: Vec<EpisodeWire> = self.read_json(operation, response, timeout).await?;

        let received_at = Utc::now();
        let episodes = wires
            .into_iter()
            .map(|w| w.into_episode(received_at))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|detail| malformed(status, detail))?;

        tracing::debug!(count = episodes.len(), "Episodes listed");

        Ok(episodes)
    }

    async fn delete_episode(&self, episode_id: &EpisodeId) -> Result<(), StoreError> {
        let operation = StoreOperation::DeleteEpisode;
        let timeout = self.config.request_timeout;

        let request = self.client.delete(self.episode_url(episode_id));
        self.send(operation, request, timeout, Some(episode_id.as_str()))
            .await?;

        tracing::info!(episode_id = %episode_id, "Episode deleted");

        Ok(())
    }

    async fn generate_panel_image(
        &self,
        episode_id: &EpisodeId,
        panel_id: &PanelId,
    ) -> Result<PanelImage, StoreError> {
        let operation = StoreOperation::GeneratePanelImage;
        let timeout = self.config.generate_timeout;

        tracing::debug!(
            episode_id = %episode_id,
            panel_id = %panel_id,
            "Requesting panel image"
        );

        let body = GeneratePanelBody {
            episode_id: episode_id.as_str(),
            panel_id: panel_id.as_str(),
        };
        let request = self.client.post(self.url("/panels/generate")).json(&body);
        let resource = format!("{}/{}", episode_id, panel_id);
        let response = self
            .send(operation, request, timeout, Some(&resource))
            .await?;
        let status = response.status().as_u16();
        let wire: PanelImageWire = self.read_json(operation, response, timeout).await?;

        let image_base64 = wire
            .image_base64
            .filter(|i| !i.is_empty())
            .ok_or_else(|| malformed(status, "missing field `image_base64`".to_string()))?;
        let cached = wire.status.as_deref() == Some("cached");

        tracing::info!(
            episode_id = %episode_id,
            panel_id = %panel_id,
            cached,
            image_size = image_base64.len(),
            "Panel image received"
        );

        Ok(PanelImage {
            image_base64,
            cached,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.url("/health"))
            .timeout(self.config.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
