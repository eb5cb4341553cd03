//! 测试用负载

use super::Workload;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Notify;

/// 固定返回错误
pub(crate) struct FailingWorkload {
    reason: String,
}

impl FailingWorkload {
    pub(crate) fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Workload for FailingWorkload {
    async fn run(&self, _user_id: &str, _session_id: i64) -> anyhow::Result<Vec<u8>> {
        Err(anyhow::anyhow!("{}", self.reason))
    }
}

pub(crate) struct PanickingWorkload;

#[async_trait]
impl Workload for PanickingWorkload {
    async fn run(&self, _user_id: &str, _session_id: i64) -> anyhow::Result<Vec<u8>> {
        panic!("kernel launch failed")
    }
}

/// 等待放行后才输出，用于观察任务未完成时的状态
pub(crate) struct GatedWorkload {
    gate: Arc<Notify>,
    payload: Vec<u8>,
}

impl GatedWorkload {
    pub(crate) fn new(payload: Vec<u8>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                gate: gate.clone(),
                payload,
            },
            gate,
        )
    }
}

#[async_trait]
impl Workload for GatedWorkload {
    async fn run(&self, _user_id: &str, _session_id: i64) -> anyhow::Result<Vec<u8>> {
        self.gate.notified().await;
        Ok(self.payload.clone())
    }
}
