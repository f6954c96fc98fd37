//! Fake Episode Store - 内存实现，用于测试
//!
//! 不发出任何网络请求；分格生成结果可以按分格预先编排

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::application::ports::{EpisodeStorePort, PanelImage, StoreError, StoreOperation};
use crate::domain::{
    derive_title, draft_scenes, Episode, EpisodeId, Panel, PanelId, StoryboardConfig,
    StorySubmission, Title,
};

/// 分格生成的预设结果
#[derive(Debug, Clone)]
pub enum PanelScript {
    /// 返回指定图片
    Image(String),
    /// 返回指定错误
    Fail(StoreError),
    /// 等待放行后返回指定图片
    Gated { gate: Arc<Notify>, image: String },
}

/// Fake Episode Store
pub struct FakeEpisodeStore {
    /// episode_id -> (插入序号, Episode)
    episodes: DashMap<EpisodeId, (u64, Episode)>,
    /// panel_id -> 预设结果队列
    panel_scripts: DashMap<PanelId, VecDeque<PanelScript>>,
    /// 下一次调用指定操作时返回的错误
    failures: DashMap<StoreOperation, StoreError>,
    /// panel_id -> 生成请求次数
    generate_calls: DashMap<PanelId, usize>,
    /// 固定的分格场景（为空时按句子拆分故事）
    fixed_scenes: Vec<String>,
    healthy: bool,
    sequence: AtomicU64,
}

impl Default for FakeEpisodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEpisodeStore {
    pub fn new() -> Self {
        Self {
            episodes: DashMap::new(),
            panel_scripts: DashMap::new(),
            failures: DashMap::new(),
            generate_calls: DashMap::new(),
            fixed_scenes: Vec::new(),
            healthy: true,
            sequence: AtomicU64::new(0),
        }
    }

    /// 每次提交都生成这些场景的分格
    pub fn with_fixed_scenes<I, S>(mut self, scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixed_scenes = scenes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_health(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 直接写入一个剧集
    pub fn insert_episode(&self, episode: Episode) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.episodes
            .insert(episode.episode_id().clone(), (seq, episode));
    }

    /// 为分格追加一个预设结果（按调用顺序消费）
    pub fn script_panel(&self, panel_id: &PanelId, script: PanelScript) {
        self.panel_scripts
            .entry(panel_id.clone())
            .or_default()
            .push_back(script);
    }

    /// 下一次调用 operation 时返回 error
    pub fn fail_next(&self, operation: StoreOperation, error: StoreError) {
        self.failures.insert(operation, error);
    }

    /// 分格被请求生成的次数
    pub fn generate_calls(&self, panel_id: &PanelId) -> usize {
        self.generate_calls.get(panel_id).map(|c| *c).unwrap_or(0)
    }

    pub fn total_generate_calls(&self) -> usize {
        self.generate_calls.iter().map(|c| *c.value()).sum()
    }

    fn take_failure(&self, operation: StoreOperation) -> Result<(), StoreError> {
        match self.failures.remove(&operation) {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }

    fn build_episode(&self, submission: &StorySubmission) -> Result<Episode, StoreError> {
        let scenes: Vec<(String, Option<String>)> = if self.fixed_scenes.is_empty() {
            draft_scenes(submission.story_text(), &StoryboardConfig::default())
                .into_iter()
                .map(|d| (d.scene_description, d.dialogue))
                .collect()
        } else {
            self.fixed_scenes.iter().map(|s| (s.clone(), None)).collect()
        };

        let invalid = |e: crate::domain::EpisodeError| StoreError::Server {
            status: 500,
            detail: e.to_string(),
        };

        let panels = scenes
            .into_iter()
            .enumerate()
            .map(|(order, (scene, dialogue))| {
                Panel::new(PanelId::generate(), order, scene).map(|p| p.with_dialogue(dialogue))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let title = Title::new(derive_title(submission.story_text())).map_err(invalid)?;

        Episode::new(EpisodeId::generate(), title, Utc::now(), panels)
            .map(|e| e.with_story_text(Some(submission.story_text().to_string())))
            .map_err(invalid)
    }

    fn next_script(&self, panel_id: &PanelId) -> Option<PanelScript> {
        self.panel_scripts
            .get_mut(panel_id)
            .and_then(|mut queue| queue.pop_front())
    }

    fn store_image(&self, episode_id: &EpisodeId, panel_id: &PanelId, image: &str) {
        if let Some(mut entry) = self.episodes.get_mut(episode_id) {
            match entry.1.with_panel_image(panel_id, image) {
                Ok(updated) => entry.1 = updated,
                Err(e) => tracing::warn!(error = %e, "FakeEpisodeStore: image not stored"),
            }
        }
    }
}

#[async_trait]
impl EpisodeStorePort for FakeEpisodeStore {
    async fn submit_story(&self, submission: StorySubmission) -> Result<Episode, StoreError> {
        self.take_failure(StoreOperation::SubmitStory)?;

        let episode = self.build_episode(&submission)?;
        self.insert_episode(episode.clone());

        tracing::debug!(
            episode_id = %episode.episode_id(),
            panels = episode.panel_count(),
            "FakeEpisodeStore: episode created"
        );

        Ok(episode)
    }

    async fn get_episode(&self, episode_id: &EpisodeId) -> Result<Episode, StoreError> {
        self.take_failure(StoreOperation::GetEpisode)?;

        self.episodes
            .get(episode_id)
            .map(|entry| entry.1.clone())
            .ok_or_else(|| StoreError::NotFound(episode_id.to_string()))
    }

    async fn list_episodes(&self) -> Result<Vec<Episode>, StoreError> {
        self.take_failure(StoreOperation::ListEpisodes)?;

        let mut entries: Vec<(u64, Episode)> =
            self.episodes.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(entries.into_iter().map(|(_, episode)| episode).collect())
    }

    async fn delete_episode(&self, episode_id: &EpisodeId) -> Result<(), StoreError> {
        self.take_failure(StoreOperation::DeleteEpisode)?;

        self.episodes
            .remove(episode_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(episode_id.to_string()))
    }

    async fn generate_panel_image(
        &self,
        episode_id: &EpisodeId,
        panel_id: &PanelId,
    ) -> Result<PanelImage, StoreError> {
        *self.generate_calls.entry(panel_id.clone()).or_insert(0) += 1;
        self.take_failure(StoreOperation::GeneratePanelImage)?;

        let existing = {
            let entry = self
                .episodes
                .get(episode_id)
                .ok_or_else(|| StoreError::NotFound(episode_id.to_string()))?;
            let panel = entry
                .1
                .panel(panel_id)
                .ok_or_else(|| StoreError::NotFound(format!("{}/{}", episode_id, panel_id)))?;
            panel.image_base64().map(str::to_string)
        };

        let image = match self.next_script(panel_id) {
            Some(PanelScript::Image(image)) => image,
            Some(PanelScript::Fail(error)) => return Err(error),
            Some(PanelScript::Gated { gate, image }) => {
                gate.notified().await;
                image
            }
            None => {
                if let Some(image) = existing {
                    return Ok(PanelImage {
                        image_base64: image,
                        cached: true,
                    });
                }
                format!("fake-image-{}", panel_id)
            }
        };

        self.store_image(episode_id, panel_id, &image);

        Ok(PanelImage {
            image_base64: image,
            cached: false,
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}
