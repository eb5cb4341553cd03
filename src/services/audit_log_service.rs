//! 审计日志服务
//!
//! 按会话追加只读日志。记录失败只上报，不影响触发日志的主流程。

use crate::database::dao::AuditLogDao;
use crate::database::{self, DbConnection, StorageError};
use crate::models::LogEntry;
use chrono::Utc;

/// 组合日志消息
///
/// 仅当用户名与 IP 都非空时才加前缀，否则原样返回。
pub fn format_log_message(
    message: &str,
    username: Option<&str>,
    remote_address: Option<&str>,
) -> String {
    match (username, remote_address) {
        (Some(username), Some(ip)) if !username.is_empty() && !ip.is_empty() => {
            format!("Username: {}, IP: {} - {}", username, ip, message)
        }
        _ => message.to_string(),
    }
}

/// 审计日志
#[derive(Clone)]
pub struct AuditLog {
    db: DbConnection,
}

impl AuditLog {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// 追加日志，会话 ID 不做存在性校验
    pub fn append(
        &self,
        session_id: i64,
        message: &str,
        username: Option<&str>,
        remote_address: Option<&str>,
    ) -> Result<LogEntry, StorageError> {
        let message = format_log_message(message, username, remote_address);
        let conn = database::lock(&self.db)?;
        let entry = AuditLogDao::insert(&conn, session_id, &message, Utc::now().timestamp_millis())?;
        Ok(entry)
    }

    /// 尽力记录：失败时仅输出告警
    pub fn record(
        &self,
        session_id: i64,
        message: &str,
        username: Option<&str>,
        remote_address: Option<&str>,
    ) {
        if let Err(e) = self.append(session_id, message, username, remote_address) {
            tracing::warn!(
                "[AuditLog] 写入日志失败 (session {}): {} - {}",
                session_id,
                e,
                message
            );
        }
    }

    /// 按插入顺序读取某会话的日志
    pub fn entries_for_session(&self, session_id: i64) -> Result<Vec<LogEntry>, StorageError> {
        let conn = database::lock(&self.db)?;
        Ok(AuditLogDao::list_by_session(&conn, session_id)?)
    }
}
