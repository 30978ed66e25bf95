use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use hydra_core::{models::WorkerRegistration, CoordinatorError};
use hydra_coordinator::RegisterOutcome;

use crate::{
    error::{ApiError, ApiResult},
    response::{success, success_message},
    routes::AppState,
};

/// Worker列表项视图
#[derive(Debug, Serialize)]
pub struct WorkerView {
    pub id: String,
    pub endpoint: String,
    pub registered_at: chrono::DateTime<chrono::Utc>,
    pub last_heartbeat_at: chrono::DateTime<chrono::Utc>,
    pub missed_heartbeats: u32,
}

/// 查询当前存活的Worker列表
pub async fn list_workers(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let workers: Vec<WorkerView> = state
        .registry
        .snapshot()
        .into_iter()
        .map(|w| WorkerView {
            id: w.id,
            endpoint: w.endpoint,
            registered_at: w.registered_at,
            last_heartbeat_at: w.last_heartbeat_at,
            missed_heartbeats: w.missed_heartbeats,
        })
        .collect();

    Ok(success(workers))
}

/// 注册Worker
pub async fn register_worker(
    State(state): State<AppState>,
    Json(registration): Json<WorkerRegistration>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if registration.worker_id.trim().is_empty() {
        return Err(ApiError::BadRequest("worker_id 不能为空".to_string()));
    }
    if registration.endpoint.trim().is_empty() {
        return Err(ApiError::BadRequest("endpoint 不能为空".to_string()));
    }

    let worker_id = registration.worker_id.clone();
    let message = match state.registry.register(registration) {
        RegisterOutcome::Registered => format!("Worker {worker_id} 注册成功"),
        RegisterOutcome::AlreadyRegistered => format!("Worker {worker_id} 已注册"),
    };

    Ok(success_message(message))
}

/// 注销Worker
pub async fn unregister_worker(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
) -> ApiResult<impl axum::response::IntoResponse> {
    state.registry.unregister(&worker_id)?;
    Ok(success_message(format!("Worker {worker_id} 已注销")))
}

/// Worker主动心跳上报（拉取模式下由Worker定期调用）
pub async fn worker_heartbeat(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if !state.registry.record_probe_success(&worker_id) {
        return Err(CoordinatorError::worker_not_found(&worker_id).into());
    }

    Ok(success_message("心跳已记录"))
}
