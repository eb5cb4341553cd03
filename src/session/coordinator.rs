//! 会话协调器
//!
//! 对外暴露创建会话、提交用户名、查询输出三个操作。
//! 创建会话时同步落库与记日志，后台任务异步执行，调用方无需等待。

use super::allocator::{IdSource, RandomIdSource};
use super::error::SessionError;
use super::store::SessionStore;
use crate::artifact::ArtifactStorage;
use crate::config::Config;
use crate::database::DbConnection;
use crate::models::{LogEntry, OutputStatus, SessionHandle};
use crate::services::AuditLog;
use crate::task::{TaskRunner, Workload};
use std::sync::Arc;
use tokio::runtime::Handle;

pub struct SessionCoordinator {
    sessions: SessionStore,
    audit: AuditLog,
    artifacts: ArtifactStorage,
    runner: TaskRunner,
    ids: Arc<dyn IdSource>,
    max_draw_attempts: u32,
}

impl SessionCoordinator {
    /// 使用配置中的分配区间随机生成 user_id 与端口
    ///
    /// 必须在 tokio 运行时内调用，后台任务派发到当前运行时。
    pub fn new(
        db: DbConnection,
        config: &Config,
        workload: Arc<dyn Workload>,
    ) -> Result<Self, SessionError> {
        let ids = Arc::new(RandomIdSource::from_config(&config.allocation)?);
        Self::with_id_source(db, config, workload, ids)
    }

    /// 使用自定义标识来源，配置先经过校验
    pub fn with_id_source(
        db: DbConnection,
        config: &Config,
        workload: Arc<dyn Workload>,
        ids: Arc<dyn IdSource>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let runtime = Handle::try_current()?;
        let sessions = SessionStore::new(db.clone());
        let audit = AuditLog::new(db);
        let artifacts = ArtifactStorage::with_base_dir(config.storage.output_dir.clone())?;
        let runner = TaskRunner::new(sessions.clone(), audit.clone(), workload, runtime);

        Ok(Self {
            sessions,
            audit,
            artifacts,
            runner,
            ids,
            max_draw_attempts: config.allocation.max_draw_attempts,
        })
    }

    /// 创建会话
    ///
    /// 返回时会话已落库，后台任务已派发但不保证已开始执行。
    pub fn create_session(&self, remote_address: &str) -> Result<SessionHandle, SessionError> {
        let ids = &self.ids;
        let session = self
            .sessions
            .create_with_unique_user_id(self.max_draw_attempts, || {
                (ids.draw_user_id(), ids.draw_port())
            })?
            .ok_or_else(|| {
                tracing::warn!(
                    "[SessionCoordinator] 连续 {} 次抽取 user_id 均冲突，分配区间可能已满",
                    self.max_draw_attempts
                );
                SessionError::IdSpaceExhausted {
                    attempts: self.max_draw_attempts,
                }
            })?;

        self.audit.record(
            session.id,
            &format!(
                "Created new session for user {} on port {}",
                session.user_id, session.port
            ),
            None,
            Some(remote_address),
        );

        let output_path = self.artifacts.provision(&session.user_id)?;
        self.runner
            .dispatch(&session.user_id, session.id, output_path);

        tracing::info!(
            "[SessionCoordinator] 创建会话: id={} user={} port={} ip={}",
            session.id,
            session.user_id,
            session.port,
            remote_address
        );

        Ok(SessionHandle {
            user_id: session.user_id,
            port: session.port,
        })
    }

    /// 为已有会话记录用户名，返回会话 ID
    pub fn attach_username(
        &self,
        user_id: &str,
        username: &str,
        remote_address: &str,
    ) -> Result<i64, SessionError> {
        let session_id = self.resolve(user_id)?;
        self.audit.record(
            session_id,
            "User submitted their username",
            Some(username),
            Some(remote_address),
        );
        tracing::info!(
            "[SessionCoordinator] 用户名已提交: session={} user={}",
            session_id,
            user_id
        );
        Ok(session_id)
    }

    /// 查询任务输出，不等待未完成的任务
    pub fn get_output(&self, user_id: &str) -> Result<OutputStatus, SessionError> {
        Ok(match self.artifacts.read(user_id)? {
            Some(bytes) => OutputStatus::Ready(bytes),
            None => OutputStatus::NotReady,
        })
    }

    /// 该用户最近会话的审计日志
    pub fn session_log(&self, user_id: &str) -> Result<Vec<LogEntry>, SessionError> {
        let session_id = self.resolve(user_id)?;
        Ok(self.audit.entries_for_session(session_id)?)
    }

    fn resolve(&self, user_id: &str) -> Result<i64, SessionError> {
        self.sessions
            .find_session_id_by_user_id(user_id)?
            .ok_or_else(|| SessionError::NotFound {
                user_id: user_id.to_string(),
            })
    }
}
