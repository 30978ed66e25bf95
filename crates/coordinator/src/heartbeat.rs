use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use hydra_core::{
    config::{HeartbeatConfig, HeartbeatMode},
    traits::WorkerClient,
};

use crate::registry::WorkerRegistry;

/// 心跳监控循环
///
/// 单个后台任务按固定间隔执行检测周期，周期之间绝不重叠
/// （下一个tick等待上一个周期完成）。驱逐只发生在周期开始处，
/// 基于上个周期累计的未命中次数，从不在周期中途驱逐尚未检查的Worker。
pub struct HeartbeatMonitor {
    registry: Arc<WorkerRegistry>,
    client: Arc<dyn WorkerClient>,
    config: HeartbeatConfig,
}

impl HeartbeatMonitor {
    pub fn new(
        registry: Arc<WorkerRegistry>,
        client: Arc<dyn WorkerClient>,
        config: HeartbeatConfig,
    ) -> Self {
        Self {
            registry,
            client,
            config,
        }
    }

    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "心跳监控启动，间隔 {}s，未命中阈值 {}，模式 {:?}",
            self.config.interval_seconds, self.config.miss_threshold, self.config.mode
        );

        let mut ticker = interval(Duration::from_secs(self.config.interval_seconds));
        // 周期耗时超过间隔时顺延下一个tick，而不是连发补偿
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = shutdown_rx.recv() => {
                    info!("心跳监控收到关闭信号，退出");
                    break;
                }
            }
        }
    }

    /// 执行一个检测周期：先驱逐，再逐个检查存活Worker
    ///
    /// 单次探测失败是预期内的非致命事件，只累计未命中次数；
    /// 监控循环本身不会因探测错误而终止。
    pub async fn run_cycle(&self) -> Vec<String> {
        let evicted = self
            .registry
            .evict_over_threshold(self.config.miss_threshold);

        let workers = self.registry.snapshot();
        if workers.is_empty() {
            return evicted;
        }

        match self.config.mode {
            HeartbeatMode::Push => {
                for worker in &workers {
                    match self.client.heartbeat(worker).await {
                        Ok(()) => {
                            // Worker可能在探测期间被注销，忽略即可
                            self.registry.record_probe_success(&worker.id);
                            debug!("Worker {} 心跳正常", worker.id);
                        }
                        Err(e) => {
                            if let Some(missed) = self.registry.record_probe_failure(&worker.id) {
                                warn!(
                                    "Worker {} 心跳探测失败（连续 {} 次）: {}",
                                    worker.id, missed, e
                                );
                            }
                        }
                    }
                }
            }
            HeartbeatMode::Pull => {
                // pull模式下Worker主动回调API端点刷新心跳，
                // 这里只把超过一个间隔没有来信的Worker计为未命中
                let now = Utc::now();
                let max_age = self.config.interval_seconds as i64;
                for worker in &workers {
                    if worker.is_heartbeat_stale(now, max_age) {
                        if let Some(missed) = self.registry.record_probe_failure(&worker.id) {
                            warn!(
                                "Worker {} 超过 {}s 未上报心跳（连续 {} 次）",
                                worker.id, max_age, missed
                            );
                        }
                    }
                }
            }
        }

        evicted
    }
}
