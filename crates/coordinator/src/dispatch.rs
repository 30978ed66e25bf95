use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use hydra_core::{models::ClaimedTask, traits::WorkerClient, CoordinatorError, CoordinatorResult};

use crate::registry::WorkerRegistry;

/// 派发引擎
///
/// 对每个已认领的任务从注册表快照中轮询选择一个Worker。
/// 游标是所有派发调用共享的单调递增计数器，对当时的存活数取模；
/// 它不绑定Worker身份——存活集在两次调用之间变化时，同一个下标
/// 可能落到不同的Worker上，轮询公平性以调用时观察到的集合为准。
pub struct DispatchEngine {
    registry: Arc<WorkerRegistry>,
    client: Arc<dyn WorkerClient>,
    cursor: AtomicUsize,
}

impl DispatchEngine {
    pub fn new(registry: Arc<WorkerRegistry>, client: Arc<dyn WorkerClient>) -> Self {
        Self {
            registry,
            client,
            cursor: AtomicUsize::new(0),
        }
    }

    /// 派发一个已认领的任务，成功时返回接收方Worker的id
    ///
    /// 存活集为空返回NoWorkersAvailable；下发被拒或传输失败时
    /// 错误向上传播，任务保持已认领状态（由回收循环兜底，
    /// 本引擎不做自动改派）。
    pub async fn dispatch(&self, task: &ClaimedTask) -> CoordinatorResult<String> {
        let workers = self.registry.snapshot();

        if workers.is_empty() {
            warn!("任务 {} 无法派发：没有可用的Worker节点", task.id);
            return Err(CoordinatorError::NoWorkersAvailable);
        }

        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % workers.len();
        let worker = &workers[index];

        debug!(
            "轮询选择Worker {} (下标 {}/{})，派发任务 {}",
            worker.id,
            index,
            workers.len(),
            task.id
        );

        self.client.submit(worker, task).await?;

        Ok(worker.id.clone())
    }
}
