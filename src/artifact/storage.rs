//! 任务产物存储
//!
//! 每个用户一个独立目录 `user_<user_id>/`，产物固定为 `output.txt`。
//! 写入采用临时文件 + rename，读取方只会看到"不存在"或"完整内容"。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const OUTPUT_FILE_NAME: &str = "output.txt";

/// 产物存储错误
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("产物文件操作失败 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("非法的用户标识: {0:?}")]
    InvalidKey(String),
}

impl ArtifactError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// 产物存储服务
#[derive(Debug, Clone)]
pub struct ArtifactStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl ArtifactStorage {
    /// 使用指定目录创建存储服务
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, ArtifactError> {
        fs::create_dir_all(&base_dir).map_err(|e| ArtifactError::io(&base_dir, e))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 用户标识只允许字母、数字、`-`、`_`，避免路径穿越
    fn check_key(user_id: &str) -> Result<(), ArtifactError> {
        let valid = !user_id.is_empty()
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(ArtifactError::InvalidKey(user_id.to_string()))
        }
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.base_dir.join(format!("user_{}", user_id))
    }

    /// 产物文件路径
    pub fn output_path(&self, user_id: &str) -> Result<PathBuf, ArtifactError> {
        Self::check_key(user_id)?;
        Ok(self.user_dir(user_id).join(OUTPUT_FILE_NAME))
    }

    /// 确保用户目录存在，返回产物路径
    pub fn provision(&self, user_id: &str) -> Result<PathBuf, ArtifactError> {
        let output_path = self.output_path(user_id)?;
        let user_dir = self.user_dir(user_id);
        fs::create_dir_all(&user_dir).map_err(|e| ArtifactError::io(&user_dir, e))?;
        tracing::debug!("[ArtifactStorage] 准备用户目录: {:?}", user_dir);
        Ok(output_path)
    }

    /// 读取产物，不存在时返回 None
    pub fn read(&self, user_id: &str) -> Result<Option<Vec<u8>>, ArtifactError> {
        let path = self.output_path(user_id)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ArtifactError::io(&path, e)),
        }
    }

    /// 原子写入产物
    ///
    /// 每次写入使用独立的临时文件，同一用户并发写入时后完成者覆盖先完成者。
    pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(OUTPUT_FILE_NAME);
        let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
            return Err(ArtifactError::io(&tmp_path, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(ArtifactError::io(path, e));
        }

        tracing::debug!(
            "[ArtifactStorage] 写入产物: {:?} ({} bytes)",
            path,
            bytes.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (ArtifactStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = ArtifactStorage::with_base_dir(temp_dir.path().join("outputs")).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_provision_creates_user_dir() {
        let (storage, _temp) = create_test_storage();
        let path = storage.provision("4821").unwrap();

        assert_eq!(path, storage.base_dir().join("user_4821").join("output.txt"));
        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn test_read_missing_is_none() {
        let (storage, _temp) = create_test_storage();
        assert_eq!(storage.read("4821").unwrap(), None);
        storage.provision("4821").unwrap();
        assert_eq!(storage.read("4821").unwrap(), None);
    }

    #[test]
    fn test_rejects_path_traversal() {
        let (storage, _temp) = create_test_storage();
        assert!(matches!(
            storage.read("../etc"),
            Err(ArtifactError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.provision(""),
            Err(ArtifactError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_write_atomic_then_read() {
        let (storage, _temp) = create_test_storage();
        let path = storage.provision("4821").unwrap();

        ArtifactStorage::write_atomic(&path, b"first").await.unwrap();
        ArtifactStorage::write_atomic(&path, b"second").await.unwrap();

        assert_eq!(storage.read("4821").unwrap(), Some(b"second".to_vec()));

        // 不残留临时文件
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_fails() {
        let (storage, _temp) = create_test_storage();
        let path = storage.output_path("9999").unwrap();
        let result = ArtifactStorage::write_atomic(&path, b"data").await;
        assert!(matches!(result, Err(ArtifactError::Io { .. })));
    }
}
