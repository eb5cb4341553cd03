//! 后台任务执行器
//!
//! 每次派发在独立的 tokio 任务中运行，与触发它的请求生命周期解耦。
//! 执行结果只通过产物文件与审计日志对外可见，错误不会回传给调用方。

use super::workload::Workload;
use crate::artifact::ArtifactStorage;
use crate::services::AuditLog;
use crate::session::SessionStore;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// 任务执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed(String),
}

impl TaskOutcome {
    pub fn state(&self) -> TaskState {
        match self {
            Self::Completed => TaskState::Completed,
            Self::Failed(_) => TaskState::Failed,
        }
    }
}

#[derive(Clone)]
pub struct TaskRunner {
    sessions: SessionStore,
    audit: AuditLog,
    workload: Arc<dyn Workload>,
    runtime: Handle,
}

impl TaskRunner {
    pub fn new(
        sessions: SessionStore,
        audit: AuditLog,
        workload: Arc<dyn Workload>,
        runtime: Handle,
    ) -> Self {
        Self {
            sessions,
            audit,
            workload,
            runtime,
        }
    }

    /// 派发任务，立即返回
    pub fn dispatch(&self, user_id: &str, session_id: i64, output_path: PathBuf) {
        let runner = self.clone();
        let user_id = user_id.to_string();

        tracing::debug!(
            "[TaskRunner] 派发任务: user={} session={} state={:?}",
            user_id,
            session_id,
            TaskState::Pending
        );

        self.runtime.spawn(async move {
            runner.run(&user_id, session_id, &output_path).await;
        });
    }

    /// 执行任务直到完成或失败，并把结果写入审计日志
    pub async fn run(&self, user_id: &str, session_id: i64, output_path: &Path) -> TaskOutcome {
        let outcome = self.execute(user_id, session_id, output_path).await;

        match &outcome {
            TaskOutcome::Completed => {
                tracing::info!(
                    "[TaskRunner] 任务完成: user={} session={} state={:?}",
                    user_id,
                    session_id,
                    outcome.state()
                );
            }
            TaskOutcome::Failed(reason) => {
                self.audit
                    .record(session_id, &format!("Error: {}", reason), None, None);
                tracing::warn!(
                    "[TaskRunner] 任务失败: user={} session={} state={:?} reason={}",
                    user_id,
                    session_id,
                    outcome.state(),
                    reason
                );
            }
        }

        outcome
    }

    async fn execute(&self, user_id: &str, session_id: i64, output_path: &Path) -> TaskOutcome {
        match self.sessions.get_session(session_id) {
            Ok(Some(_)) => {}
            Ok(None) => return TaskOutcome::Failed(format!("session {} not found", session_id)),
            Err(e) => return TaskOutcome::Failed(e.to_string()),
        }

        self.audit.record(
            session_id,
            &format!("Compiling and running task for user {}", user_id),
            None,
            None,
        );
        tracing::debug!(
            "[TaskRunner] 开始执行: user={} session={} state={:?}",
            user_id,
            session_id,
            TaskState::Running
        );

        let result = AssertUnwindSafe(self.workload.run(user_id, session_id))
            .catch_unwind()
            .await;
        let bytes = match result {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return TaskOutcome::Failed(e.to_string()),
            Err(panic) => return TaskOutcome::Failed(panic_message(panic.as_ref())),
        };

        if let Err(e) = ArtifactStorage::write_atomic(output_path, &bytes).await {
            return TaskOutcome::Failed(e.to_string());
        }

        self.audit.record(
            session_id,
            &format!("Output written to {}", output_path.display()),
            None,
            None,
        );
        TaskOutcome::Completed
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("task panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("task panicked: {}", s)
    } else {
        "task panicked".to_string()
    }
}
