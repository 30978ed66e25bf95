use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use hydra_core::{config::RecoveryConfig, traits::TaskRepository, CoordinatorResult};

/// 过期认领回收循环
///
/// 认领后始终没有派发成功的任务（派发时没有存活Worker、下发被拒等）
/// 会一直停留在已认领状态。本循环把claimed_at早于宽限期且从未
/// started的任务释放回认领池，由后续的认领周期重新派发。
/// 宽限期必须显著长于正常的认领到启动延迟，避免误释放在途任务。
pub struct ClaimRecovery {
    task_repo: Arc<dyn TaskRepository>,
    config: RecoveryConfig,
}

impl ClaimRecovery {
    pub fn new(task_repo: Arc<dyn TaskRepository>, config: RecoveryConfig) -> Self {
        Self { task_repo, config }
    }

    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "认领回收循环启动，间隔 {}s，宽限期 {}s",
            self.config.interval_seconds, self.config.claim_grace_seconds
        );

        let mut ticker = interval(Duration::from_secs(self.config.interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!("认领回收周期执行失败: {e}");
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("认领回收循环收到关闭信号，退出");
                    break;
                }
            }
        }
    }

    /// 执行一个回收周期，返回释放的认领数
    pub async fn run_cycle(&self) -> CoordinatorResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::seconds(self.config.claim_grace_seconds);
        let released = self
            .task_repo
            .release_stale_claims(cutoff, self.config.batch_limit)
            .await?;

        if released > 0 {
            info!("释放了 {} 个超过宽限期的认领", released);
        }

        Ok(released)
    }
}
