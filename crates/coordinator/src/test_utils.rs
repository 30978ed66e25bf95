use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use hydra_core::{
    models::{ClaimedTask, WorkerRecord},
    traits::WorkerClient,
    CoordinatorError, CoordinatorResult,
};

/// 可编排失败行为并记录下发历史的WorkerClient测试替身
#[derive(Debug, Default)]
pub struct MockWorkerClient {
    fail_all_heartbeats: AtomicBool,
    fail_all_submits: AtomicBool,
    fail_heartbeats_for: Mutex<Vec<String>>,
    heartbeat_calls: AtomicUsize,
    /// (worker_id, task_id)
    submissions: Mutex<Vec<(String, i64)>>,
}

impl MockWorkerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_heartbeat_failing(&self, failing: bool) {
        self.fail_all_heartbeats.store(failing, Ordering::SeqCst);
    }

    pub fn set_submit_failing(&self, failing: bool) {
        self.fail_all_submits.store(failing, Ordering::SeqCst);
    }

    /// 只让指定Worker的心跳探测失败
    pub fn fail_heartbeats_for(&self, worker_id: &str) {
        self.fail_heartbeats_for
            .lock()
            .unwrap()
            .push(worker_id.to_string());
    }

    pub fn heartbeat_calls(&self) -> usize {
        self.heartbeat_calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<(String, i64)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkerClient for MockWorkerClient {
    async fn heartbeat(&self, worker: &WorkerRecord) -> CoordinatorResult<()> {
        self.heartbeat_calls.fetch_add(1, Ordering::SeqCst);

        let targeted = self
            .fail_heartbeats_for
            .lock()
            .unwrap()
            .contains(&worker.id);
        if targeted || self.fail_all_heartbeats.load(Ordering::SeqCst) {
            return Err(CoordinatorError::worker_unreachable(&worker.id, "模拟探测超时"));
        }

        Ok(())
    }

    async fn submit(&self, worker: &WorkerRecord, task: &ClaimedTask) -> CoordinatorResult<()> {
        if self.fail_all_submits.load(Ordering::SeqCst) {
            return Err(CoordinatorError::worker_unreachable(&worker.id, "模拟下发失败"));
        }

        self.submissions
            .lock()
            .unwrap()
            .push((worker.id.clone(), task.id));
        Ok(())
    }
}
