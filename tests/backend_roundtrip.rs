//! 客户端与本地开发后端的端到端测试

use axum::{http::StatusCode, response::IntoResponse, routing::get, routing::post, Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use dailytoon::application::{
    EpisodeStorePort, HydrationController, PanelImageState, StoreError, StoreOperation,
};
use dailytoon::domain::{EpisodeId, PanelId, StoryboardConfig, StorySubmission};
use dailytoon::infrastructure::adapters::{
    HttpEpisodeStore, HttpEpisodeStoreConfig, LocalStoryboarder, PlaceholderArtist,
};
use dailytoon::infrastructure::http::{AppState, HttpServer};
use dailytoon::infrastructure::memory::InMemoryEpisodeRepository;

async fn spawn_backend() -> String {
    let state = AppState::new(
        InMemoryEpisodeRepository::new().arc(),
        Arc::new(LocalStoryboarder::new(StoryboardConfig {
            min_chars: 1,
            max_panels: 6,
        })),
        Arc::new(PlaceholderArtist::new()),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(HttpServer::new(state).run_on(listener));
    format!("http://{}", addr)
}

async fn spawn_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> HttpEpisodeStore {
    HttpEpisodeStore::new(HttpEpisodeStoreConfig::new(base_url)).unwrap()
}

fn story(text: &str) -> StorySubmission {
    StorySubmission::new(text).unwrap()
}

#[tokio::test]
async fn submit_returns_panels_without_images_and_get_matches() {
    let store = client(&spawn_backend().await);

    let created = store
        .submit_story(story("I went hiking. I saw a fox. It ran into the trees."))
        .await
        .unwrap();
    assert_eq!(created.panel_count(), 3);
    assert!(created.panels().iter().all(|p| !p.has_image()));
    assert_eq!(created.title().as_str(), "I went hiking");

    let fetched = store.get_episode(created.episode_id()).await.unwrap();
    assert!(fetched.same_storyboard(&created));
    assert_eq!(fetched.created_date(), created.created_date());
}

#[tokio::test]
async fn list_is_newest_first_and_delete_removes_episode() {
    let store = client(&spawn_backend().await);

    let first = store.submit_story(story("Morning coffee.")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = store.submit_story(story("Evening walk.")).await.unwrap();

    let listed = store.list_episodes().await.unwrap();
    let ids: Vec<&EpisodeId> = listed.iter().map(|e| e.episode_id()).collect();
    assert_eq!(ids, vec![second.episode_id(), first.episode_id()]);

    store.delete_episode(first.episode_id()).await.unwrap();

    let result = store.get_episode(first.episode_id()).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    let listed = store.list_episodes().await.unwrap();
    assert!(listed.iter().all(|e| e.episode_id() != first.episode_id()));
}

#[tokio::test]
async fn delete_of_unknown_episode_is_not_found() {
    let store = client(&spawn_backend().await);

    let result = store
        .delete_episode(&EpisodeId::new("does-not-exist").unwrap())
        .await;

    match result {
        Err(error @ StoreError::NotFound(_)) => {
            assert_eq!(error.user_message(), "That episode or panel no longer exists.");
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn regenerating_a_populated_panel_returns_cached_image() {
    let store = client(&spawn_backend().await);
    let episode = store.submit_story(story("I went hiking.")).await.unwrap();
    let panel_id = episode.panels()[0].panel_id().clone();

    let first = store
        .generate_panel_image(episode.episode_id(), &panel_id)
        .await
        .unwrap();
    assert!(!first.cached);

    let second = store
        .generate_panel_image(episode.episode_id(), &panel_id)
        .await
        .unwrap();
    assert!(second.cached);
    assert_eq!(second.image_base64, first.image_base64);

    let fetched = store.get_episode(episode.episode_id()).await.unwrap();
    assert_eq!(
        fetched.panel(&panel_id).unwrap().image_base64(),
        Some(first.image_base64.as_str())
    );
}

#[tokio::test]
async fn generate_for_unknown_panel_is_not_found() {
    let store = client(&spawn_backend().await);
    let episode = store.submit_story(story("I went hiking.")).await.unwrap();

    let result = store
        .generate_panel_image(episode.episode_id(), &PanelId::new("ghost").unwrap())
        .await;

    match result {
        Err(error @ StoreError::NotFound(_)) => {
            assert!(error.to_string().contains("ghost"));
            assert!(error.user_message().contains("panel"));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn hydration_fills_every_panel() {
    let store: Arc<dyn EpisodeStorePort> = Arc::new(client(&spawn_backend().await));
    let episode = store
        .submit_story(story("I went hiking. I saw a fox. It ran into the trees."))
        .await
        .unwrap();
    let episode_id = episode.episode_id().clone();

    let controller = HydrationController::new(store.clone(), episode);
    let report = controller.hydrate().await;

    assert_eq!(report.generated().count(), 3);
    assert!(controller.snapshot().is_complete());

    let stored = store.get_episode(&episode_id).await.unwrap();
    assert!(stored.is_fully_illustrated());
}

#[tokio::test]
async fn slow_generation_times_out_and_leaves_panel_retryable() {
    let backend = spawn_backend().await;
    let seed = client(&backend);
    let episode = seed.submit_story(story("I went hiking.")).await.unwrap();
    let panel_id = episode.panels()[0].panel_id().clone();

    let slow = Router::new().route(
        "/api/panels/generate",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "image_base64": "late", "status": "generated" }))
        }),
    );
    let store: Arc<dyn EpisodeStorePort> = Arc::new(
        HttpEpisodeStore::new(
            HttpEpisodeStoreConfig::new(spawn_router(slow).await)
                .with_generate_timeout(Duration::from_millis(200)),
        )
        .unwrap(),
    );

    let controller = HydrationController::new(store, episode);
    let report = controller.hydrate().await;

    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(
        failed[0].1,
        &StoreError::Timeout {
            operation: StoreOperation::GeneratePanelImage,
            after: Duration::from_millis(200),
        }
    );
    assert_eq!(
        controller.snapshot().state_of(&panel_id),
        Some(PanelImageState::Missing)
    );
}

#[tokio::test]
async fn server_error_detail_is_propagated() {
    let failing = Router::new()
        .route(
            "/api/panels/generate",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Failed to generate: quota exceeded" })),
                )
                    .into_response()
            }),
        )
        .route(
            "/api/story/submit",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "detail": "Story text cannot be empty" })),
                )
                    .into_response()
            }),
        );
    let store = client(&spawn_router(failing).await);

    let result = store
        .generate_panel_image(
            &EpisodeId::new("e1").unwrap(),
            &PanelId::new("p1").unwrap(),
        )
        .await;
    assert_eq!(
        result,
        Err(StoreError::Server {
            status: 500,
            detail: "Failed to generate: quota exceeded".to_string(),
        })
    );

    let result = store.submit_story(story("anything")).await;
    match result {
        Err(error @ StoreError::Server { status: 400, .. }) => {
            assert_eq!(
                error.user_message(),
                "Something went wrong on the server: Story text cannot be empty"
            );
        }
        other => panic!("expected Server error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_episode_is_rejected_at_the_boundary() {
    let broken = Router::new().route(
        "/api/episodes/:episode_id",
        get(|| async { Json(json!({ "episode_id": "e1", "title": "No panels here" })) }),
    );
    let store = client(&spawn_router(broken).await);

    let result = store.get_episode(&EpisodeId::new("e1").unwrap()).await;
    match result {
        Err(StoreError::Server { detail, .. }) => assert!(detail.starts_with("malformed response")),
        other => panic!("expected malformed response, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let store = client("http://127.0.0.1:1");

    let result = store.list_episodes().await;
    match result {
        Err(error @ StoreError::Network(_)) => {
            assert_eq!(
                error.user_message(),
                "Cannot reach the server. Please check your connection."
            );
        }
        other => panic!("expected Network error, got {:?}", other),
    }
    assert!(!store.health_check().await);
}

#[tokio::test]
async fn character_name_shapes_profile_and_panels() {
    let store = client(&spawn_backend().await);

    let created = store
        .submit_story(story("I went hiking. I saw a fox.").with_character_name("Mina"))
        .await
        .unwrap();

    let profile = created.character_profile().unwrap();
    assert!(profile.starts_with("Mina: "));
    assert!(created
        .panels()
        .iter()
        .all(|p| p.character_description() == Some(profile)));
}

#[tokio::test]
async fn slow_submit_times_out_as_submit_story() {
    let slow = Router::new().route(
        "/api/story/submit",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let store = HttpEpisodeStore::new(
        HttpEpisodeStoreConfig::new(spawn_router(slow).await)
            .with_submit_timeout(Duration::from_millis(200))
            .with_probe_before_submit(false),
    )
    .unwrap();

    let result = store.submit_story(story("I went hiking.")).await;
    assert_eq!(
        result,
        Err(StoreError::Timeout {
            operation: StoreOperation::SubmitStory,
            after: Duration::from_millis(200),
        })
    );
}

#[tokio::test]
async fn get_episode_server_error_keeps_detail() {
    let failing = Router::new().route(
        "/api/episodes/:episode_id",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "database unavailable" })),
            )
                .into_response()
        }),
    );
    let store = client(&spawn_router(failing).await);

    let result = store.get_episode(&EpisodeId::new("e1").unwrap()).await;
    assert_eq!(
        result,
        Err(StoreError::Server {
            status: 500,
            detail: "database unavailable".to_string(),
        })
    );
}

#[tokio::test]
async fn list_on_misrouted_backend_is_a_server_error() {
    let store = client(&spawn_router(Router::new()).await);

    let result = store.list_episodes().await;
    assert!(matches!(result, Err(StoreError::Server { status: 404, .. })));
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status_reason() {
    let failing = Router::new().route(
        "/api/episodes/:episode_id",
        axum::routing::delete(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let store = client(&spawn_router(failing).await);

    let result = store.delete_episode(&EpisodeId::new("e1").unwrap()).await;
    assert_eq!(
        result,
        Err(StoreError::Server {
            status: 503,
            detail: "Service Unavailable".to_string(),
        })
    );
}
