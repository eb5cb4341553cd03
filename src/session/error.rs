use crate::artifact::ArtifactError;
use crate::config::ConfigError;
use crate::database::StorageError;

/// 会话操作错误
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("Session not found: {user_id}")]
    NotFound { user_id: String },
    #[error("连续 {attempts} 次抽取的 user_id 均已被占用")]
    IdSpaceExhausted { attempts: u32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("未检测到 tokio 运行时: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

impl SessionError {
    /// 是否属于调用方可处理的客户端错误
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Artifact(ArtifactError::InvalidKey(_))
        )
    }
}
