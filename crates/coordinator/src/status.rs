use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use hydra_core::{
    models::StatusTransition, traits::TaskRepository, CoordinatorError, CoordinatorResult,
};

/// 任务状态回调处理
///
/// 校验状态值并把对应的生命周期时间戳盖到存储上。对重复的相同状态
/// 是幂等的（重新盖时间戳，不报错）。不对started/终态的先后顺序做
/// 机械校验，顺序不变量由调用方负责。
pub struct StatusTracker {
    task_repo: Arc<dyn TaskRepository>,
}

impl StatusTracker {
    pub fn new(task_repo: Arc<dyn TaskRepository>) -> Self {
        Self { task_repo }
    }

    pub async fn update_status(&self, task_id: i64, status: &str) -> CoordinatorResult<()> {
        let transition: StatusTransition = status.parse()?;

        let updated = self
            .task_repo
            .set_lifecycle_timestamp(task_id, transition.field(), Utc::now())
            .await?;

        if !updated {
            return Err(CoordinatorError::task_not_found(task_id));
        }

        info!("任务 {} 状态更新为 {status}", task_id);
        Ok(())
    }
}
