//! 会话管理模块
//!
//! 提供以下功能：
//! - 会话创建（user_id 查重分配、端口分配）
//! - 用户名提交与审计
//! - 任务输出查询

mod allocator;
mod coordinator;
mod error;
mod store;

pub use allocator::{IdSource, RandomIdSource};
pub use coordinator::SessionCoordinator;
pub use error::SessionError;
pub use store::SessionStore;

#[cfg(test)]
pub(crate) use allocator::ScriptedIdSource;
