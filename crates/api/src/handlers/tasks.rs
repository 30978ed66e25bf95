use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::ApiResult,
    response::success_message,
    routes::AppState,
};

/// 任务状态回调请求体
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// 任务状态回调：Worker上报 STARTED / COMPLETED / FAILED
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    state
        .status_tracker
        .update_status(task_id, &request.status)
        .await?;

    Ok(success_message(format!(
        "任务 {task_id} 状态已更新为 {}",
        request.status.to_uppercase()
    )))
}
