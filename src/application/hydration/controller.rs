//! Episode Hydration Controller
//!
//! 为已加载的剧集补全分格图片：
//! - 按叙事顺序为每个缺图分格发出一次生成请求，请求在同一任务内并发等待
//! - 结果按 panel_id 合并到最新状态，完成顺序无关
//! - 单个分格失败不影响其他分格，也不会让整体补全失败
//! - 不自动重试，失败分格等待手动重试

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;

use super::state::{HydratedEpisode, PanelImageState};
use crate::application::ports::{EpisodeStorePort, StoreError};
use crate::domain::{Episode, EpisodeId, PanelId};

/// 补全错误
#[derive(Debug, Error)]
pub enum HydrationError {
    #[error("Panel {panel_id} does not belong to episode {episode_id}")]
    UnknownPanel {
        episode_id: EpisodeId,
        panel_id: PanelId,
    },
}

/// 单个分格的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOutcome {
    /// 图片已合并
    Generated { panel_id: PanelId, cached: bool },
    /// 生成失败，分格回到 Missing
    Failed { panel_id: PanelId, error: StoreError },
    /// 分格已有图片或正在生成，未发出请求
    Skipped {
        panel_id: PanelId,
        state: PanelImageState,
    },
}

impl PanelOutcome {
    pub fn panel_id(&self) -> &PanelId {
        match self {
            PanelOutcome::Generated { panel_id, .. }
            | PanelOutcome::Failed { panel_id, .. }
            | PanelOutcome::Skipped { panel_id, .. } => panel_id,
        }
    }
}

/// 一次补全的汇总（按完成顺序）
#[derive(Debug, Clone, Default)]
pub struct HydrationReport {
    pub outcomes: Vec<PanelOutcome>,
}

impl HydrationReport {
    pub fn generated(&self) -> impl Iterator<Item = &PanelId> {
        self.outcomes.iter().filter_map(|o| match o {
            PanelOutcome::Generated { panel_id, .. } => Some(panel_id),
            _ => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&PanelId, &StoreError)> {
        self.outcomes.iter().filter_map(|o| match o {
            PanelOutcome::Failed { panel_id, error } => Some((panel_id, error)),
            _ => None,
        })
    }

    pub fn requested(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o, PanelOutcome::Skipped { .. }))
            .count()
    }
}

/// 剧集补全控制器
pub struct HydrationController {
    store: Arc<dyn EpisodeStorePort>,
    episode_id: EpisodeId,
    state: watch::Sender<HydratedEpisode>,
}

impl HydrationController {
    pub fn new(store: Arc<dyn EpisodeStorePort>, episode: Episode) -> Self {
        let episode_id = episode.episode_id().clone();
        let (state, _) = watch::channel(HydratedEpisode::from_episode(episode));
        Self {
            store,
            episode_id,
            state,
        }
    }

    /// 从后端加载剧集并创建控制器
    pub async fn load(
        store: Arc<dyn EpisodeStorePort>,
        episode_id: &EpisodeId,
    ) -> Result<Self, StoreError> {
        let episode = store.get_episode(episode_id).await?;
        Ok(Self::new(store, episode))
    }

    pub fn episode_id(&self) -> &EpisodeId {
        &self.episode_id
    }

    /// 订阅状态变化（每次状态转换都会通知）
    pub fn subscribe(&self) -> watch::Receiver<HydratedEpisode> {
        self.state.subscribe()
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> HydratedEpisode {
        self.state.borrow().clone()
    }

    /// 为所有 Missing 分格发出生成请求并等待全部完成
    pub async fn hydrate(&self) -> HydrationReport {
        let candidates = self.state.borrow().missing_panel_ids();
        let mut report = HydrationReport::default();

        if candidates.is_empty() {
            tracing::debug!(episode_id = %self.episode_id, "Nothing to hydrate");
            return report;
        }

        tracing::info!(
            episode_id = %self.episode_id,
            panels = candidates.len(),
            "Hydrating episode"
        );

        let mut in_flight = FuturesUnordered::new();
        for panel_id in candidates {
            match self.begin(&panel_id) {
                Ok(None) => in_flight.push(self.generate(panel_id)),
                Ok(Some(state)) => report.outcomes.push(PanelOutcome::Skipped { panel_id, state }),
                Err(e) => tracing::warn!(error = %e, "Skipping panel"),
            }
        }

        while let Some(outcome) = in_flight.next().await {
            report.outcomes.push(outcome);
        }

        let (present, missing) = {
            let snapshot = self.state.borrow();
            (
                snapshot.count(PanelImageState::Present),
                snapshot.count(PanelImageState::Missing),
            )
        };
        tracing::info!(
            episode_id = %self.episode_id,
            present,
            missing,
            failed = report.failed().count(),
            "Hydration finished"
        );

        report
    }

    /// 手动重试单个分格
    ///
    /// 仅 Missing 分格会发出请求；InProgress/Present 返回 Skipped
    pub async fn retry_panel(&self, panel_id: &PanelId) -> Result<PanelOutcome, HydrationError> {
        match self.begin(panel_id)? {
            None => {
                tracing::info!(
                    episode_id = %self.episode_id,
                    panel_id = %panel_id,
                    "Retrying panel generation"
                );
                Ok(self.generate(panel_id.clone()).await)
            }
            Some(state) => Ok(PanelOutcome::Skipped {
                panel_id: panel_id.clone(),
                state,
            }),
        }
    }

    /// Missing -> InProgress
    ///
    /// 返回 None 表示已开始；Some(state) 表示分格处于其他状态
    fn begin(&self, panel_id: &PanelId) -> Result<Option<PanelImageState>, HydrationError> {
        let mut current = None;
        self.state.send_if_modified(|state| {
            current = state.state_of(panel_id);
            if current == Some(PanelImageState::Missing) {
                *state = state.with_generation_started(panel_id);
                true
            } else {
                false
            }
        });

        match current {
            None => Err(HydrationError::UnknownPanel {
                episode_id: self.episode_id.clone(),
                panel_id: panel_id.clone(),
            }),
            Some(PanelImageState::Missing) => Ok(None),
            Some(other) => Ok(Some(other)),
        }
    }

    async fn generate(&self, panel_id: PanelId) -> PanelOutcome {
        let started = Instant::now();
        let result = self
            .store
            .generate_panel_image(&self.episode_id, &panel_id)
            .await;

        match result {
            Ok(image) => {
                let cached = image.cached;
                self.state
                    .send_modify(|state| *state = state.with_image(&panel_id, image.image_base64));
                tracing::info!(
                    episode_id = %self.episode_id,
                    panel_id = %panel_id,
                    cached,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Panel image merged"
                );
                PanelOutcome::Generated { panel_id, cached }
            }
            Err(error) => {
                self.state
                    .send_modify(|state| *state = state.with_generation_failed(&panel_id));
                tracing::warn!(
                    episode_id = %self.episode_id,
                    panel_id = %panel_id,
                    error = %error,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Panel generation failed"
                );
                PanelOutcome::Failed { panel_id, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::StoreOperation;
    use crate::domain::StorySubmission;
    use crate::infrastructure::adapters::{FakeEpisodeStore, PanelScript};
    use std::time::Duration;
    use tokio::sync::Notify;

    async fn submitted(store: &FakeEpisodeStore, story: &str) -> Episode {
        store
            .submit_story(StorySubmission::new(story).unwrap())
            .await
            .unwrap()
    }

    fn panel_ids(episode: &Episode) -> Vec<PanelId> {
        episode
            .panels()
            .iter()
            .map(|p| p.panel_id().clone())
            .collect()
    }

    #[tokio::test]
    async fn test_initial_state_reflects_existing_images() {
        let store = FakeEpisodeStore::new()
            .with_fixed_scenes(["one", "two"])
            .arc();
        let episode = submitted(&store, "story").await;
        let ids = panel_ids(&episode);
        let episode = episode.with_panel_image(&ids[0], "existing").unwrap();

        let controller = HydrationController::new(store, episode);
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.state_of(&ids[0]), Some(PanelImageState::Present));
        assert_eq!(snapshot.state_of(&ids[1]), Some(PanelImageState::Missing));
    }

    #[tokio::test]
    async fn test_completions_merge_in_any_order() {
        let store = FakeEpisodeStore::new()
            .with_fixed_scenes(["first", "second", "third"])
            .arc();
        let episode = submitted(&store, "story").await;
        let ids = panel_ids(&episode);
        let gate = Arc::new(Notify::new());

        store.script_panel(&ids[0], PanelScript::Fail(StoreError::Network("reset".into())));
        store.script_panel(
            &ids[1],
            PanelScript::Gated {
                gate: gate.clone(),
                image: "img-2".into(),
            },
        );
        store.script_panel(&ids[2], PanelScript::Image("img-3".into()));

        let controller = HydrationController::new(store.clone(), episode);
        let mut rx = controller.subscribe();

        let observe = async {
            let (p1, p2, p3) = (ids[0].clone(), ids[1].clone(), ids[2].clone());
            {
                let state = rx
                    .wait_for(|s| s.state_of(&p3) == Some(PanelImageState::Present))
                    .await
                    .unwrap();
                assert_eq!(state.state_of(&p1), Some(PanelImageState::Missing));
                assert_eq!(state.state_of(&p2), Some(PanelImageState::InProgress));
                assert_eq!(
                    state.panel(&p3).unwrap().panel().image_base64(),
                    Some("img-3")
                );
            }
            gate.notify_one();
        };

        let (report, ()) = tokio::join!(controller.hydrate(), observe);

        assert_eq!(report.requested(), 3);
        assert_eq!(report.failed().count(), 1);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state_of(&ids[0]), Some(PanelImageState::Missing));
        assert_eq!(snapshot.state_of(&ids[1]), Some(PanelImageState::Present));
        assert_eq!(snapshot.state_of(&ids[2]), Some(PanelImageState::Present));
        assert_eq!(
            snapshot.panel(&ids[1]).unwrap().panel().image_base64(),
            Some("img-2")
        );

        // 顺序保持不变
        let order: Vec<PanelId> = snapshot
            .panels()
            .iter()
            .map(|p| p.panel_id().clone())
            .collect();
        assert_eq!(order, ids);
    }

    #[tokio::test]
    async fn test_one_timeout_leaves_only_that_panel_retryable() {
        let store = FakeEpisodeStore::new()
            .with_fixed_scenes([
                "A person laces up hiking boots at dawn",
                "The trail winds through a quiet forest",
                "A red fox watches from behind a fern",
            ])
            .arc();
        let episode = submitted(&store, "I went hiking and saw a fox").await;
        let ids = panel_ids(&episode);

        store.script_panel(&ids[0], PanelScript::Image("A".into()));
        store.script_panel(&ids[1], PanelScript::Image("B".into()));
        store.script_panel(
            &ids[2],
            PanelScript::Fail(StoreError::Timeout {
                operation: StoreOperation::GeneratePanelImage,
                after: Duration::from_secs(90),
            }),
        );

        let controller = HydrationController::new(store.clone(), episode);
        let report = controller.hydrate().await;

        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, &ids[2]);
        assert!(matches!(failed[0].1, StoreError::Timeout { .. }));

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.panel(&ids[0]).unwrap().panel().image_base64(), Some("A"));
        assert_eq!(snapshot.panel(&ids[1]).unwrap().panel().image_base64(), Some("B"));
        let third = snapshot.panel(&ids[2]).unwrap();
        assert_eq!(third.state(), PanelImageState::Missing);
        assert!(third.is_retryable());

        let stored = store.get_episode(controller.episode_id()).await.unwrap();
        assert!(!stored.panel(&ids[2]).unwrap().has_image());
        assert_eq!(stored.panel(&ids[0]).unwrap().image_base64(), Some("A"));

        // 手动重试
        let outcome = controller.retry_panel(&ids[2]).await.unwrap();
        assert!(matches!(outcome, PanelOutcome::Generated { cached: false, .. }));
        assert!(controller.snapshot().is_complete());
    }

    #[tokio::test]
    async fn test_retry_skips_present_panel_and_rejects_unknown() {
        let store = FakeEpisodeStore::new().with_fixed_scenes(["only"]).arc();
        let episode = submitted(&store, "story").await;
        let ids = panel_ids(&episode);

        let controller = HydrationController::new(store.clone(), episode);
        controller.hydrate().await;

        let outcome = controller.retry_panel(&ids[0]).await.unwrap();
        assert_eq!(
            outcome,
            PanelOutcome::Skipped {
                panel_id: ids[0].clone(),
                state: PanelImageState::Present,
            }
        );
        assert_eq!(store.generate_calls(&ids[0]), 1);

        let unknown = PanelId::new("nope").unwrap();
        assert!(matches!(
            controller.retry_panel(&unknown).await,
            Err(HydrationError::UnknownPanel { .. })
        ));
    }

    #[tokio::test]
    async fn test_hydrate_complete_episode_issues_no_requests() {
        let store = FakeEpisodeStore::new()
            .with_fixed_scenes(["one", "two"])
            .arc();
        let episode = submitted(&store, "story").await;

        let controller = HydrationController::new(store.clone(), episode);
        let first = controller.hydrate().await;
        assert_eq!(first.generated().count(), 2);

        let second = controller.hydrate().await;
        assert_eq!(second.requested(), 0);
        assert_eq!(store.total_generate_calls(), 2);
    }

    #[tokio::test]
    async fn test_load_propagates_not_found() {
        let store = FakeEpisodeStore::new().arc();
        let missing = EpisodeId::new("missing").unwrap();

        let result = HydrationController::load(store, &missing).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_surfaces_server_error_then_recovers() {
        let store = FakeEpisodeStore::new().with_fixed_scenes(["one"]).arc();
        let episode = submitted(&store, "story").await;
        let failure = StoreError::Server {
            status: 500,
            detail: "database unavailable".into(),
        };
        store.fail_next(StoreOperation::GetEpisode, failure.clone());

        let result = HydrationController::load(store.clone(), episode.episode_id()).await;
        assert_eq!(result.err(), Some(failure));

        let controller = HydrationController::load(store, episode.episode_id())
            .await
            .unwrap();
        assert_eq!(controller.episode_id(), episode.episode_id());
    }
}
