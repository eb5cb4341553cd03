//! 任务产物存储模块
//!
//! ## 目录结构
//! ```text
//! outputs/
//! ├── user_{user-id}/
//! │   └── output.txt
//! └── ...
//! ```

pub mod storage;

pub use storage::{ArtifactError, ArtifactStorage};
