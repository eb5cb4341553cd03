//! YAML 配置读写

use super::types::Config;
use std::path::{Path, PathBuf};

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("解析 YAML 失败: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("配置无效: {0}")]
    Invalid(String),
}

/// 默认配置文件路径 `~/.cudabox/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".cudabox").join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("config.yaml"))
}

/// 加载配置，文件不存在时返回默认配置
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::info!("[CONFIG] 配置文件不存在，使用默认配置: {:?}", path);
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&content)?;
    config.validate()?;
    tracing::info!("[CONFIG] 已加载配置: {:?}", path);
    Ok(config)
}

/// 保存配置为 YAML
pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 校验分配区间与日志级别
    pub fn validate(&self) -> Result<(), ConfigError> {
        let alloc = &self.allocation;
        if alloc.user_id_min > alloc.user_id_max {
            return Err(ConfigError::Invalid(format!(
                "user_id 区间无效: {}..={}",
                alloc.user_id_min, alloc.user_id_max
            )));
        }
        if alloc.port_min > alloc.port_max {
            return Err(ConfigError::Invalid(format!(
                "端口区间无效: {}..={}",
                alloc.port_min, alloc.port_max
            )));
        }
        if alloc.max_draw_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_draw_attempts 必须大于 0".to_string(),
            ));
        }
        if self.logging.tracing_level().is_none() {
            return Err(ConfigError::Invalid(format!(
                "未知日志级别: {}",
                self.logging.level
            )));
        }
        if self.storage.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output_dir 不能为空".to_string()));
        }
        Ok(())
    }
}
