use crate::models::LogEntry;
use rusqlite::{params, Connection};

pub struct AuditLogDao;

impl AuditLogDao {
    /// 追加一条日志
    ///
    /// 时间戳取 `max(now_millis, 上一条日志的时间戳)`，保证按插入顺序单调不减。
    pub fn insert(
        conn: &Connection,
        session_id: i64,
        message: &str,
        now_millis: i64,
    ) -> Result<LogEntry, rusqlite::Error> {
        conn.execute(
            "INSERT INTO logs (session_id, message, timestamp)
             VALUES (?1, ?2, MAX(?3, COALESCE((SELECT timestamp FROM logs ORDER BY id DESC LIMIT 1), 0)))",
            params![session_id, message, now_millis],
        )?;
        let id = conn.last_insert_rowid();
        let timestamp: i64 = conn.query_row(
            "SELECT timestamp FROM logs WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(LogEntry {
            id,
            session_id,
            message: message.to_string(),
            timestamp,
        })
    }

    /// 按插入顺序列出某会话的全部日志
    pub fn list_by_session(
        conn: &Connection,
        session_id: i64,
    ) -> Result<Vec<LogEntry>, rusqlite::Error> {
        let mut stmt = conn.prepare(
            "SELECT id, session_id, message, timestamp FROM logs
             WHERE session_id = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![session_id], |row| {
            Ok(LogEntry {
                id: row.get(0)?,
                session_id: row.get(1)?,
                message: row.get(2)?,
                timestamp: row.get(3)?,
            })
        })?;

        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
