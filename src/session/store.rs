//! 会话存储
//!
//! 只提供插入与查询，会话一经创建不再修改。

use crate::database::dao::SessionDao;
use crate::database::{self, DbConnection, StorageError};
use crate::models::Session;
use chrono::Utc;

#[derive(Clone)]
pub struct SessionStore {
    db: DbConnection,
}

impl SessionStore {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// 插入会话，返回自增会话 ID
    pub fn create_session(&self, user_id: &str, port: u16) -> Result<i64, StorageError> {
        let conn = database::lock(&self.db)?;
        Ok(SessionDao::insert(
            &conn,
            user_id,
            port,
            Utc::now().timestamp_millis(),
        )?)
    }

    /// 抽取未被占用的 user_id 并插入会话
    ///
    /// 查重与插入在同一次加锁内完成。`draw` 返回 `(user_id, port)`，
    /// 连续 `max_attempts` 次冲突返回 `Ok(None)`。
    pub fn create_with_unique_user_id<F>(
        &self,
        max_attempts: u32,
        mut draw: F,
    ) -> Result<Option<Session>, StorageError>
    where
        F: FnMut() -> (String, u16),
    {
        let conn = database::lock(&self.db)?;
        for attempt in 1..=max_attempts {
            let (user_id, port) = draw();
            if SessionDao::user_id_exists(&conn, &user_id)? {
                tracing::debug!(
                    "[SessionStore] user_id {} 已被占用，重新抽取 ({}/{})",
                    user_id,
                    attempt,
                    max_attempts
                );
                continue;
            }

            let created_at = Utc::now().timestamp_millis();
            let id = SessionDao::insert(&conn, &user_id, port, created_at)?;
            return Ok(Some(Session {
                id,
                user_id,
                port,
                created_at,
            }));
        }
        Ok(None)
    }

    /// 查找该用户最近创建的会话 ID
    pub fn find_session_id_by_user_id(&self, user_id: &str) -> Result<Option<i64>, StorageError> {
        let conn = database::lock(&self.db)?;
        Ok(SessionDao::find_latest_id_by_user_id(&conn, user_id)?)
    }

    pub fn get_session(&self, session_id: i64) -> Result<Option<Session>, StorageError> {
        let conn = database::lock(&self.db)?;
        Ok(SessionDao::get_by_id(&conn, session_id)?)
    }
}
