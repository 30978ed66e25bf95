pub mod models;

pub use models::{
    ApiConfig, AppConfig, ClaimConfig, DatabaseConfig, HeartbeatConfig, HeartbeatMode,
    NetworkConfig, RecoveryConfig,
};
