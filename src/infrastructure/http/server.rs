//! HTTP Server
//!
//! 开发后端的 Router 组装与监听

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 请求体上限（故事文本）
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// 开发后端
pub struct HttpServer {
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// 完整 Router：路由 + 请求体上限 + 错误日志 + trace + CORS
    pub fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .max_age(Duration::from_secs(3600));

        create_routes()
            .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 绑定 addr 并运行，shutdown 完成后优雅退出
    pub async fn run_with_shutdown<F>(self, addr: &str, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr).await?;
        self.serve_until(listener, shutdown).await
    }

    /// 在已绑定的监听器上运行直到进程结束（端口 0 时由系统分配）
    pub async fn run_on(self, listener: TcpListener) -> std::io::Result<()> {
        self.serve_until(listener, std::future::pending()).await
    }

    pub async fn serve_until<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();

        info!(addr = %listener.local_addr()?, "Dev backend listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StoryboardConfig;
    use crate::infrastructure::adapters::{LocalStoryboarder, PlaceholderArtist};
    use crate::infrastructure::memory::InMemoryEpisodeRepository;
    use tokio::sync::oneshot;

    fn server() -> HttpServer {
        HttpServer::new(AppState::new(
            InMemoryEpisodeRepository::new().arc(),
            Arc::new(LocalStoryboarder::new(StoryboardConfig::default())),
            Arc::new(PlaceholderArtist::new()),
        ))
    }

    #[tokio::test]
    async fn test_serve_until_stops_on_shutdown_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let task = tokio::spawn(server().serve_until(listener, async {
            let _ = stopped.await;
        }));

        let response = reqwest::get(format!("http://{}/api/health", addr))
            .await
            .unwrap();
        assert!(response.status().is_success());

        stop.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_with_shutdown_reports_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let result = server().run_with_shutdown(&addr, async {}).await;
        assert!(result.is_err());
    }
}
