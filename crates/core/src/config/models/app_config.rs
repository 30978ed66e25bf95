use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api::ApiConfig,
    coordinator::{ClaimConfig, HeartbeatConfig, NetworkConfig, RecoveryConfig},
    database::DatabaseConfig,
};

/// 协调器全局配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub heartbeat: HeartbeatConfig,
    pub claim: ClaimConfig,
    pub recovery: RecoveryConfig,
    pub network: NetworkConfig,
    pub api: ApiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/hydra".to_string(),
                max_connections: 10,
                min_connections: 1,
                connection_timeout_seconds: 30,
            },
            heartbeat: HeartbeatConfig::default(),
            claim: ClaimConfig::default(),
            recovery: RecoveryConfig::default(),
            network: NetworkConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置
    ///
    /// 加载顺序：
    /// 1. 内置默认值
    /// 2. TOML配置文件（显式路径或默认查找路径）
    /// 3. 环境变量覆盖（前缀 HYDRA_，层级分隔符 __）
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        builder = Self::set_defaults(builder)?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = ["config/hydra.toml", "hydra.toml", "/etc/hydra/config.toml"];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("HYDRA")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("解析配置失败")?;

        config.validate()?;

        Ok(config)
    }

    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(builder
            .set_default("database.url", "postgresql://localhost/hydra")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connection_timeout_seconds", 30)?
            .set_default("heartbeat.interval_seconds", 3)?
            .set_default("heartbeat.miss_threshold", 3)?
            .set_default("heartbeat.mode", "push")?
            .set_default("claim.interval_seconds", 5)?
            .set_default("claim.lookahead_seconds", 30)?
            .set_default("claim.batch_limit", 10)?
            .set_default("recovery.enabled", true)?
            .set_default("recovery.interval_seconds", 60)?
            .set_default("recovery.claim_grace_seconds", 300)?
            .set_default("recovery.batch_limit", 100)?
            .set_default("network.request_timeout_ms", 2000)?
            .set_default("api.bind_address", "0.0.0.0:5001")?)
    }

    /// 校验所有配置段
    pub fn validate(&self) -> Result<()> {
        self.database.validate().context("数据库配置无效")?;
        self.heartbeat.validate().context("心跳配置无效")?;
        self.claim.validate().context("认领配置无效")?;
        self.recovery.validate().context("回收配置无效")?;
        self.network.validate().context("网络配置无效")?;
        self.api.validate().context("API配置无效")?;
        Ok(())
    }
}
