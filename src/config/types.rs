//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::domain::StoryboardConfig;
use crate::infrastructure::adapters::{HttpEpisodeStoreConfig, DEFAULT_BACKEND_URL};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 剧集后端（客户端侧）配置
    #[serde(default)]
    pub backend: BackendConfig,

    /// 本地开发后端配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 本地分镜配置
    #[serde(default)]
    pub storyboard: StoryboardSettings,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 剧集后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// 后端基础 URL（不含 /api）
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// 读取/删除请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// 提交故事超时（秒）
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,

    /// 分格生成超时（秒）
    #[serde(default = "default_generate_timeout")]
    pub generate_timeout_secs: u64,

    /// 健康检查超时（秒）
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,

    /// 提交前是否发出后台健康探测
    #[serde(default = "default_probe_before_submit")]
    pub probe_before_submit: bool,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_submit_timeout() -> u64 {
    60
}

fn default_generate_timeout() -> u64 {
    90
}

fn default_health_timeout() -> u64 {
    5
}

fn default_probe_before_submit() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
            submit_timeout_secs: default_submit_timeout(),
            generate_timeout_secs: default_generate_timeout(),
            health_timeout_secs: default_health_timeout(),
            probe_before_submit: default_probe_before_submit(),
        }
    }
}

impl BackendConfig {
    /// 转换为 HTTP 客户端配置
    pub fn store_config(&self) -> HttpEpisodeStoreConfig {
        HttpEpisodeStoreConfig::new(self.url.clone())
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_submit_timeout(Duration::from_secs(self.submit_timeout_secs))
            .with_generate_timeout(Duration::from_secs(self.generate_timeout_secs))
            .with_health_timeout(Duration::from_secs(self.health_timeout_secs))
            .with_probe_before_submit(self.probe_before_submit)
    }
}

/// 开发后端服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8003
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 本地分镜配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoryboardSettings {
    /// 每个剧集最多分格数
    #[serde(default = "default_max_panels")]
    pub max_panels: usize,

    /// 短句合并阈值（字符数）
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

fn default_max_panels() -> usize {
    crate::domain::storyboard::DEFAULT_MAX_PANELS
}

fn default_min_chars() -> usize {
    crate::domain::storyboard::DEFAULT_MIN_CHARS
}

impl Default for StoryboardSettings {
    fn default() -> Self {
        Self {
            max_panels: default_max_panels(),
            min_chars: default_min_chars(),
        }
    }
}

impl From<&StoryboardSettings> for StoryboardConfig {
    fn from(settings: &StoryboardSettings) -> Self {
        Self {
            min_chars: settings.min_chars,
            max_panels: settings.max_panels,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.backend.url, "http://localhost:8003");
        assert_eq!(config.backend.submit_timeout_secs, 60);
        assert_eq!(config.backend.generate_timeout_secs, 90);
        assert_eq!(config.server.port, 8003);
        assert_eq!(config.storyboard.max_panels, 6);
        assert!(!config.log.json);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8003");
    }

    #[test]
    fn test_store_config_uses_per_operation_timeouts() {
        let backend = BackendConfig {
            url: "http://backend:9000".into(),
            generate_timeout_secs: 120,
            probe_before_submit: false,
            ..Default::default()
        };

        let store = backend.store_config();
        assert_eq!(store.base_url, "http://backend:9000");
        assert_eq!(store.request_timeout, Duration::from_secs(30));
        assert_eq!(store.generate_timeout, Duration::from_secs(120));
        assert!(!store.probe_before_submit);
    }
}
