//! 配置类型定义

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 应用配置根
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub allocation: AllocationConfig,
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// 存储路径配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite 数据库文件
    pub database_path: PathBuf,
    /// 任务产物根目录，每个用户一个 `user_<id>` 子目录
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("logs.db"),
            output_dir: PathBuf::from("outputs"),
        }
    }
}

/// 用户 ID 与端口分配范围（闭区间）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub user_id_min: u32,
    pub user_id_max: u32,
    pub port_min: u16,
    pub port_max: u16,
    /// 用户 ID 冲突时的最大重抽次数
    pub max_draw_attempts: u32,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            user_id_min: 1000,
            user_id_max: 9999,
            port_min: 8000,
            port_max: 9000,
            max_draw_attempts: 32,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace / debug / info / warn / error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> Option<tracing::Level> {
        self.level.trim().parse().ok()
    }
}
