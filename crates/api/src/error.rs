use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hydra_core::CoordinatorError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("协调器错误: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::Coordinator(CoordinatorError::TaskNotFound { id }) => (
                StatusCode::NOT_FOUND,
                "TASK_NOT_FOUND",
                format!("任务 {id} 不存在"),
            ),
            ApiError::Coordinator(CoordinatorError::WorkerNotFound { id }) => (
                StatusCode::NOT_FOUND,
                "WORKER_NOT_FOUND",
                format!("Worker {id} 不存在"),
            ),
            ApiError::Coordinator(CoordinatorError::InvalidStatusTransition { status }) => (
                StatusCode::BAD_REQUEST,
                "INVALID_STATUS",
                format!("无效的任务状态: {status}"),
            ),
            ApiError::Coordinator(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COORDINATOR_ERROR",
                e.to_string(),
            ),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = Json(json!({
            "success": false,
            "error": error_type,
            "message": message,
            "timestamp": chrono::Utc::now(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
