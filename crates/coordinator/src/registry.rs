use std::sync::Mutex;

use chrono::Utc;
use tracing::{info, warn};

use hydra_core::{
    models::{WorkerRecord, WorkerRegistration},
    CoordinatorError, CoordinatorResult,
};

/// 注册结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    /// 重复注册：保留已有记录，不重置计数器和端点
    AlreadyRegistered,
}

/// Worker成员注册表
///
/// 整张表由一把互斥锁守护，注册处理器、心跳监控和派发引擎的
/// 所有读-改-写序列彼此原子。表内按注册顺序排列，保证同一个
/// 派发周期内快照顺序稳定，轮询选择才有意义。
/// 锁从不跨网络调用持有：派发方拿到的是克隆出的快照。
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    inner: Mutex<Vec<WorkerRecord>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册Worker（幂等）
    ///
    /// 已存在的id直接返回成功且不做任何修改：Worker自身的注册重试
    /// 不应掩盖真实的重新注册需求。
    pub fn register(&self, registration: WorkerRegistration) -> RegisterOutcome {
        let mut workers = self.inner.lock().unwrap();

        if workers.iter().any(|w| w.id == registration.worker_id) {
            info!("Worker {} 已注册，忽略重复注册", registration.worker_id);
            return RegisterOutcome::AlreadyRegistered;
        }

        let record = WorkerRecord::new(registration);
        info!("Worker {} 注册成功，端点: {}", record.id, record.endpoint);
        workers.push(record);
        RegisterOutcome::Registered
    }

    pub fn unregister(&self, worker_id: &str) -> CoordinatorResult<()> {
        let mut workers = self.inner.lock().unwrap();

        let Some(index) = workers.iter().position(|w| w.id == worker_id) else {
            return Err(CoordinatorError::worker_not_found(worker_id));
        };

        workers.remove(index);
        info!("Worker {} 已注销", worker_id);
        Ok(())
    }

    /// 当前存活Worker的不可变快照，按注册顺序排列
    pub fn snapshot(&self) -> Vec<WorkerRecord> {
        self.inner.lock().unwrap().clone()
    }

    pub fn contains(&self, worker_id: &str) -> bool {
        self.inner.lock().unwrap().iter().any(|w| w.id == worker_id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 探测成功或收到Worker主动心跳，返回false表示该Worker已不在表中
    pub fn record_probe_success(&self, worker_id: &str) -> bool {
        let mut workers = self.inner.lock().unwrap();
        match workers.iter_mut().find(|w| w.id == worker_id) {
            Some(worker) => {
                worker.mark_heartbeat(Utc::now());
                true
            }
            None => false,
        }
    }

    /// 探测失败，返回累计未命中次数；Worker已不在表中时返回None
    pub fn record_probe_failure(&self, worker_id: &str) -> Option<u32> {
        let mut workers = self.inner.lock().unwrap();
        workers
            .iter_mut()
            .find(|w| w.id == worker_id)
            .map(|worker| worker.mark_missed())
    }

    /// 驱逐未命中次数达到阈值的Worker，返回被驱逐的id
    pub fn evict_over_threshold(&self, threshold: u32) -> Vec<String> {
        let mut workers = self.inner.lock().unwrap();
        let mut evicted = Vec::new();

        workers.retain(|worker| {
            if worker.missed_heartbeats >= threshold {
                warn!(
                    "Worker {} 连续 {} 次心跳未命中，驱逐出注册表",
                    worker.id, worker.missed_heartbeats
                );
                evicted.push(worker.id.clone());
                false
            } else {
                true
            }
        });

        evicted
    }
}

#[cfg(test)]
impl WorkerRegistry {
    /// 把某个Worker的上次心跳时间拨回过去，用于测试pull模式的过期判定
    pub(crate) fn rewind_heartbeat_for_test(&self, worker_id: &str, seconds: i64) {
        let mut workers = self.inner.lock().unwrap();
        if let Some(worker) = workers.iter_mut().find(|w| w.id == worker_id) {
            worker.last_heartbeat_at = Utc::now() - chrono::Duration::seconds(seconds);
        }
    }
}
