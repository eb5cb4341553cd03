//! cudabox
//!
//! 为每个客户端分配独立会话（user_id、端口、输出目录），在后台执行任务并产出结果文件，
//! 所有生命周期事件按会话写入只追加的审计日志。

pub mod artifact;
pub mod config;
pub mod database;
pub mod models;
pub mod server;
pub mod services;
pub mod session;
pub mod task;

pub use models::{LogEntry, OutputStatus, Session, SessionHandle};
pub use session::{SessionCoordinator, SessionError};
