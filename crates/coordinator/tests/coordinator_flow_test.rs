use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use hydra_coordinator::{
    ClaimRecovery, DispatchEngine, HeartbeatMonitor, StatusTracker, TaskClaimer, WorkerRegistry,
};
use hydra_core::{
    config::{ClaimConfig, HeartbeatConfig, HeartbeatMode, RecoveryConfig},
    models::{ClaimedTask, TaskLifecycle, WorkerRecord, WorkerRegistration},
    traits::{TaskRepository, WorkerClient},
    CoordinatorError, CoordinatorResult,
};
use hydra_infrastructure::MemoryTaskRepository;

/// 记录下发请求、可切换探测失败的WorkerClient测试替身
#[derive(Debug, Default)]
struct RecordingWorkerClient {
    heartbeats_failing: AtomicBool,
    submissions: Mutex<Vec<(String, i64, String)>>,
}

impl RecordingWorkerClient {
    fn new() -> Self {
        Self::default()
    }

    fn submissions(&self) -> Vec<(String, i64, String)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkerClient for RecordingWorkerClient {
    async fn heartbeat(&self, worker: &WorkerRecord) -> CoordinatorResult<()> {
        if self.heartbeats_failing.load(Ordering::SeqCst) {
            return Err(CoordinatorError::worker_unreachable(&worker.id, "探测超时"));
        }
        Ok(())
    }

    async fn submit(&self, worker: &WorkerRecord, task: &ClaimedTask) -> CoordinatorResult<()> {
        self.submissions.lock().unwrap().push((
            worker.id.clone(),
            task.id,
            task.command.clone(),
        ));
        Ok(())
    }
}

fn registration(id: &str, endpoint: &str) -> WorkerRegistration {
    WorkerRegistration {
        worker_id: id.to_string(),
        endpoint: endpoint.to_string(),
        metadata: serde_json::json!({"num_cpu": 4}),
    }
}

struct Coordinator {
    repo: Arc<MemoryTaskRepository>,
    registry: Arc<WorkerRegistry>,
    client: Arc<RecordingWorkerClient>,
    claimer: TaskClaimer,
    monitor: HeartbeatMonitor,
    tracker: StatusTracker,
    recovery: ClaimRecovery,
}

fn coordinator() -> Coordinator {
    let repo = Arc::new(MemoryTaskRepository::new());
    let registry = Arc::new(WorkerRegistry::new());
    let client = Arc::new(RecordingWorkerClient::new());
    let dispatcher = Arc::new(DispatchEngine::new(registry.clone(), client.clone()));

    Coordinator {
        repo: repo.clone(),
        registry: registry.clone(),
        client: client.clone(),
        claimer: TaskClaimer::new(repo.clone(), dispatcher, ClaimConfig::default()),
        monitor: HeartbeatMonitor::new(
            registry,
            client,
            HeartbeatConfig {
                interval_seconds: 3,
                miss_threshold: 3,
                mode: HeartbeatMode::Push,
            },
        ),
        tracker: StatusTracker::new(repo.clone()),
        recovery: ClaimRecovery::new(
            repo,
            RecoveryConfig {
                enabled: true,
                interval_seconds: 60,
                claim_grace_seconds: -1, // 测试中让认领立即视为过期
                batch_limit: 100,
            },
        ),
    }
}

#[tokio::test]
async fn test_full_lifecycle_claim_dispatch_complete() {
    let c = coordinator();
    c.registry
        .register(registration("w-1", "http://10.0.0.3:8081"));
    let t1 = c.repo.insert("echo hello", Utc::now());

    // 一个认领周期内：T1被认领并下发到W1
    assert_eq!(c.claimer.run_cycle().await.unwrap(), 1);

    let task = c.repo.get_by_id(t1).await.unwrap().unwrap();
    assert!(task.claimed_at.is_some());

    let submissions = c.client.submissions();
    assert_eq!(
        submissions,
        vec![("w-1".to_string(), t1, "echo hello".to_string())]
    );

    // Worker回调状态转移，时间戳逐个落库
    c.tracker.update_status(t1, "STARTED").await.unwrap();
    c.tracker.update_status(t1, "COMPLETED").await.unwrap();

    let task = c.repo.get_by_id(t1).await.unwrap().unwrap();
    assert_eq!(task.lifecycle(), TaskLifecycle::Completed);
    assert!(task.started_at.is_some());
    assert!(task.completed_at.is_some());
    assert!(task.failed_at.is_none());
}

#[tokio::test]
async fn test_no_workers_leaves_task_claimed_until_recovered() {
    let c = coordinator();
    let t2 = c.repo.insert("echo orphan", Utc::now());

    // 没有注册任何Worker：认领成功、派发失败，任务滞留在已认领状态
    assert_eq!(c.claimer.run_cycle().await.unwrap(), 1);

    let task = c.repo.get_by_id(t2).await.unwrap().unwrap();
    assert!(task.claimed_at.is_some());
    assert!(task.started_at.is_none());
    assert!(task.completed_at.is_none());
    assert!(task.failed_at.is_none());
    assert!(c.client.submissions().is_empty());

    // 回收循环释放过期认领，注册Worker后下一个周期重新派发
    assert_eq!(c.recovery.run_cycle().await.unwrap(), 1);
    c.registry
        .register(registration("w-1", "http://10.0.0.3:8081"));
    assert_eq!(c.claimer.run_cycle().await.unwrap(), 1);

    let submissions = c.client.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].1, t2);
}

#[tokio::test]
async fn test_worker_evicted_after_three_missed_probes() {
    let c = coordinator();
    c.registry
        .register(registration("w-1", "http://10.0.0.3:8081"));
    c.client.heartbeats_failing.store(true, Ordering::SeqCst);

    // 三个失败周期累计满阈值，随后的周期开始处驱逐
    for _ in 0..3 {
        assert!(c.monitor.run_cycle().await.is_empty());
    }
    assert!(c.registry.contains("w-1"));

    let evicted = c.monitor.run_cycle().await;
    assert_eq!(evicted, vec!["w-1".to_string()]);
    assert!(c.registry.snapshot().is_empty());

    // 被驱逐后派发视同没有Worker
    let t = c.repo.insert("echo nobody", Utc::now());
    c.claimer.run_cycle().await.unwrap();
    let task = c.repo.get_by_id(t).await.unwrap().unwrap();
    assert!(task.claimed_at.is_some());
    assert!(c.client.submissions().is_empty());
}

#[tokio::test]
async fn test_status_callbacks_validate_input() {
    let c = coordinator();
    let id = c.repo.insert("echo hi", Utc::now());

    assert!(matches!(
        c.tracker.update_status(9999, "STARTED").await.unwrap_err(),
        CoordinatorError::TaskNotFound { id: 9999 }
    ));
    assert!(matches!(
        c.tracker.update_status(id, "BOGUS").await.unwrap_err(),
        CoordinatorError::InvalidStatusTransition { .. }
    ));
}

#[tokio::test]
async fn test_round_robin_spreads_batch_across_fleet() {
    let c = coordinator();
    for id in ["w-1", "w-2", "w-3"] {
        c.registry
            .register(registration(id, &format!("http://{id}:8081")));
    }
    let now = Utc::now();
    for i in 0..6 {
        c.repo
            .insert(&format!("echo {i}"), now - chrono::Duration::seconds(6 - i));
    }

    assert_eq!(c.claimer.run_cycle().await.unwrap(), 6);

    // 每个Worker各收到两个任务，且批次按scheduled_at先后派发
    let submissions = c.client.submissions();
    assert_eq!(submissions.len(), 6);
    for worker in ["w-1", "w-2", "w-3"] {
        assert_eq!(submissions.iter().filter(|s| s.0 == worker).count(), 2);
    }
    let task_ids: Vec<i64> = submissions.iter().map(|s| s.1).collect();
    let mut sorted = task_ids.clone();
    sorted.sort();
    assert_eq!(task_ids, sorted);
}
