//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "DAILYTOON";

/// 加载应用配置
///
/// `config_path` 为 None 时搜索当前目录下的 config.toml / config.local.toml
///
/// # 环境变量示例
/// - `DAILYTOON_BACKEND__URL=https://dailytoon.example.com`
/// - `DAILYTOON_BACKEND__GENERATE_TIMEOUT_SECS=120`
/// - `DAILYTOON_SERVER__PORT=8080`
/// - `DAILYTOON_LOG__JSON=true`
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值
    builder = builder
        .set_default("backend.url", "http://localhost:8003")?
        .set_default("backend.request_timeout_secs", 30)?
        .set_default("backend.submit_timeout_secs", 60)?
        .set_default("backend.generate_timeout_secs", 90)?
        .set_default("backend.health_timeout_secs", 5)?
        .set_default("backend.probe_before_submit", true)?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8003)?
        .set_default("storyboard.max_panels", 6)?
        .set_default("storyboard.min_chars", 20)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量，层级分隔符为 __
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.backend.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Backend URL cannot be empty".to_string(),
        ));
    }

    let timeouts = [
        ("request_timeout_secs", config.backend.request_timeout_secs),
        ("submit_timeout_secs", config.backend.submit_timeout_secs),
        ("generate_timeout_secs", config.backend.generate_timeout_secs),
        ("health_timeout_secs", config.backend.health_timeout_secs),
    ];
    if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
        return Err(ConfigError::ValidationError(format!(
            "Backend {} cannot be 0",
            name
        )));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.storyboard.max_panels == 0 {
        return Err(ConfigError::ValidationError(
            "Storyboard max_panels cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Backend URL: {}", config.backend.url);
    tracing::info!(
        "Backend Timeouts: request {}s, submit {}s, generate {}s, health {}s",
        config.backend.request_timeout_secs,
        config.backend.submit_timeout_secs,
        config.backend.generate_timeout_secs,
        config.backend.health_timeout_secs
    );
    tracing::info!("Probe Before Submit: {}", config.backend.probe_before_submit);
    tracing::info!("Dev Server: {}", config.server.addr());
    tracing::info!(
        "Storyboard: max {} panels, min {} chars",
        config.storyboard.max_panels,
        config.storyboard.min_chars
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
