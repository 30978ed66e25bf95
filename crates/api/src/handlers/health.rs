use serde_json::json;

use crate::response::success;

/// 健康检查
pub async fn health_check() -> impl axum::response::IntoResponse {
    success(json!({ "status": "ok" }))
}
