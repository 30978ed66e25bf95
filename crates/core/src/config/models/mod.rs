mod api;
mod app_config;
mod coordinator;
mod database;

pub use api::ApiConfig;
pub use app_config::AppConfig;
pub use coordinator::{ClaimConfig, HeartbeatConfig, HeartbeatMode, NetworkConfig, RecoveryConfig};
pub use database::DatabaseConfig;
