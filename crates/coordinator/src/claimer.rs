use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use hydra_core::{config::ClaimConfig, traits::TaskRepository, CoordinatorResult};

use crate::dispatch::DispatchEngine;

/// 任务认领循环
///
/// 按固定间隔查询存储中落入认领窗口的未认领任务并原子地标记认领，
/// 然后逐个同步交给派发引擎。认领在交接之前已经持久化：认领和派发
/// 之间崩溃留下的是已认领未派发的任务（由回收循环释放），
/// 而不是可能被重复派发的未认领任务。
pub struct TaskClaimer {
    task_repo: Arc<dyn TaskRepository>,
    dispatcher: Arc<DispatchEngine>,
    config: ClaimConfig,
}

impl TaskClaimer {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        dispatcher: Arc<DispatchEngine>,
        config: ClaimConfig,
    ) -> Self {
        Self {
            task_repo,
            dispatcher,
            config,
        }
    }

    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "认领循环启动，间隔 {}s，窗口 {}s，批次上限 {}",
            self.config.interval_seconds, self.config.lookahead_seconds, self.config.batch_limit
        );

        let mut ticker = interval(Duration::from_secs(self.config.interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        // 认领失败留待下一个周期重试，循环本身不终止
                        error!("认领周期执行失败: {e}");
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("认领循环收到关闭信号，退出");
                    break;
                }
            }
        }
    }

    /// 执行一个认领周期，返回本周期认领的任务数
    pub async fn run_cycle(&self) -> CoordinatorResult<usize> {
        let deadline = Utc::now() + chrono::Duration::seconds(self.config.lookahead_seconds);
        let claimed = self
            .task_repo
            .claim_due_tasks(deadline, self.config.batch_limit)
            .await?;

        // 空批次不是错误，等下一个周期即可
        if claimed.is_empty() {
            return Ok(0);
        }

        info!("本周期认领了 {} 个任务", claimed.len());

        for task in &claimed {
            match self.dispatcher.dispatch(task).await {
                Ok(worker_id) => {
                    info!("任务 {} 已派发到Worker {}", task.id, worker_id);
                }
                Err(e) => {
                    // 任务保持已认领状态，等待回收循环释放后重新进入认领池
                    warn!("任务 {} 认领成功但派发失败: {e}", task.id);
                }
            }
        }

        Ok(claimed.len())
    }
}
