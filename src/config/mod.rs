//! 配置管理模块
//!
//! 提供 YAML 配置文件加载与校验，配置以结构体形式显式传递，不使用全局状态。

mod types;
mod yaml;

pub use types::{AllocationConfig, Config, LoggingConfig, ServerConfig, StorageConfig};
pub use yaml::{default_config_path, load_config, save_config, ConfigError};
