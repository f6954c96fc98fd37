//! HTTP Layer - 本地开发后端
//!
//! 与生产后端相同的 RESTful API，供客户端端到端联调

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::HttpServer;
pub use state::AppState;
