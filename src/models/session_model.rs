//! 会话与审计日志数据模型

use serde::{Deserialize, Serialize};

/// 会话记录，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// 自增会话 ID，从不复用
    pub id: i64,
    /// 用户标识
    pub user_id: String,
    /// 分配的端口（仅作标识，不做监听）
    pub port: u16,
    /// 创建时间（Unix 时间戳，毫秒）
    pub created_at: i64,
}

/// 审计日志条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub session_id: i64,
    pub message: String,
    /// 写入时间（Unix 时间戳，毫秒），按插入顺序单调不减
    pub timestamp: i64,
}

/// 创建会话后返回给调用方的句柄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
    pub user_id: String,
    pub port: u16,
}

/// 输出查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStatus {
    /// 产物已完整写入
    Ready(Vec<u8>),
    /// 任务尚未完成（或已失败），调用方应稍后重试
    NotReady,
}
