use async_trait::async_trait;

use crate::errors::CoordinatorResult;
use crate::models::{ClaimedTask, WorkerRecord};

/// 协调器作为客户端对Worker发起的调用
///
/// 两个调用都必须带有界超时：无响应的Worker不能让监控循环或
/// 派发循环阻塞超过超时时间。传输失败与显式拒绝同等对待。
#[async_trait]
pub trait WorkerClient: Send + Sync {
    /// 探测Worker的heartbeat端点，Err即计为一次未命中
    async fn heartbeat(&self, worker: &WorkerRecord) -> CoordinatorResult<()>;

    /// 将已认领的任务下发到Worker的submit端点
    async fn submit(&self, worker: &WorkerRecord, task: &ClaimedTask) -> CoordinatorResult<()>;
}
