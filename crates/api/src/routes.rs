use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use hydra_coordinator::{StatusTracker, WorkerRegistry};

use crate::handlers::{
    health::health_check,
    tasks::update_task_status,
    workers::{list_workers, register_worker, unregister_worker, worker_heartbeat},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WorkerRegistry>,
    pub status_tracker: Arc<StatusTracker>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // Worker成员管理
        .route("/api/workers", get(list_workers))
        .route("/api/workers/register", post(register_worker))
        .route("/api/workers/{id}/unregister", post(unregister_worker))
        .route("/api/workers/{id}/heartbeat", post(worker_heartbeat))
        // 任务状态回调
        .route("/api/tasks/{id}/status", post(update_task_status))
        .with_state(state)
}
