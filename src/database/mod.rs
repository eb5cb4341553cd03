//! 数据库模块
//!
//! 会话与审计日志持久化到单个 SQLite 连接，所有写入经由同一把锁串行化。

pub mod dao;
pub mod schema;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// 共享数据库连接
pub type DbConnection = Arc<Mutex<Connection>>;

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("数据库错误: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("创建数据库目录失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("数据库锁已失效")]
    LockPoisoned,
}

/// 打开（必要时创建）数据库文件并建表
pub fn init_database(path: &Path) -> Result<DbConnection, StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    schema::create_tables(&conn)?;
    tracing::info!("[DATABASE] 数据库已就绪: {:?}", path);
    Ok(Arc::new(Mutex::new(conn)))
}

/// 内存数据库，进程退出即丢弃
pub fn open_in_memory() -> Result<DbConnection, StorageError> {
    let conn = Connection::open_in_memory()?;
    schema::create_tables(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 获取连接锁
pub fn lock(db: &DbConnection) -> Result<MutexGuard<'_, Connection>, StorageError> {
    db.lock().map_err(|_| StorageError::LockPoisoned)
}
