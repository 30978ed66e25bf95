pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// 创建协调器API应用
pub fn create_app(state: AppState) -> Router {
    routes::create_routes(state).layer(TraceLayer::new_for_http())
}
