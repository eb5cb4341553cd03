use crate::models::Session;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub struct SessionDao;

impl SessionDao {
    /// 插入会话，返回新分配的自增 ID
    pub fn insert(
        conn: &Connection,
        user_id: &str,
        port: u16,
        created_at: i64,
    ) -> Result<i64, rusqlite::Error> {
        conn.execute(
            "INSERT INTO sessions (user_id, port, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, port, created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按 user_id 查找最近创建的会话 ID
    pub fn find_latest_id_by_user_id(
        conn: &Connection,
        user_id: &str,
    ) -> Result<Option<i64>, rusqlite::Error> {
        conn.query_row(
            "SELECT id FROM sessions WHERE user_id = ?1 ORDER BY id DESC LIMIT 1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Session>, rusqlite::Error> {
        conn.query_row(
            "SELECT id, user_id, port, created_at FROM sessions WHERE id = ?1",
            params![id],
            Self::map_row,
        )
        .optional()
    }

    pub fn user_id_exists(conn: &Connection, user_id: &str) -> Result<bool, rusqlite::Error> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE user_id = ?1)",
            params![user_id],
            |row| row.get(0),
        )
    }

    fn map_row(row: &Row<'_>) -> Result<Session, rusqlite::Error> {
        Ok(Session {
            id: row.get(0)?,
            user_id: row.get(1)?,
            port: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}
