//! 任务负载
//!
//! 任务执行器只关心负载产生的字节和成功/失败，具体计算由实现方决定。

use async_trait::async_trait;

#[async_trait]
pub trait Workload: Send + Sync {
    /// 执行一次计算，返回要写入产物的全部字节
    async fn run(&self, user_id: &str, session_id: i64) -> anyhow::Result<Vec<u8>>;
}

/// 模拟 CUDA 编译运行，直接生成固定输出
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWorkload;

#[async_trait]
impl Workload for SimulatedWorkload {
    async fn run(&self, user_id: &str, _session_id: i64) -> anyhow::Result<Vec<u8>> {
        Ok(format!("CUDA program output for user {}\nSimulation complete!", user_id).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_output() {
        let bytes = SimulatedWorkload.run("4821", 1).await.unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "CUDA program output for user 4821\nSimulation complete!"
        );
    }
}
