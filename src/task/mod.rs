//! 后台任务模块

mod runner;
mod workload;

#[cfg(test)]
pub(crate) mod testing;

pub use runner::{TaskOutcome, TaskRunner, TaskState};
pub use workload::{SimulatedWorkload, Workload};
