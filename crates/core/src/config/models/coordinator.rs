use serde::{Deserialize, Serialize};

/// 心跳检测模式
///
/// Push：协调器主动探测Worker的heartbeat端点（默认，活性判定权在协调器）。
/// Pull：Worker定期回调协调器，监控循环只检查上次心跳是否过期。
/// 两种模式共享同一套未命中阈值和周期首驱逐语义。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HeartbeatMode {
    Push,
    Pull,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    pub interval_seconds: u64,
    pub miss_threshold: u32,
    pub mode: HeartbeatMode,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3,
            miss_threshold: 3,
            mode: HeartbeatMode::Push,
        }
    }
}

impl HeartbeatConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval_seconds == 0 {
            return Err(anyhow::anyhow!("心跳检测间隔必须大于0"));
        }

        if self.miss_threshold == 0 {
            return Err(anyhow::anyhow!("心跳未命中阈值必须大于0"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimConfig {
    pub interval_seconds: u64,
    /// 认领窗口：scheduled_at落在 now+lookahead 之前的任务可被认领
    pub lookahead_seconds: i64,
    pub batch_limit: i64,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 5,
            lookahead_seconds: 30,
            batch_limit: 10,
        }
    }
}

impl ClaimConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval_seconds == 0 {
            return Err(anyhow::anyhow!("认领循环间隔必须大于0"));
        }

        if self.lookahead_seconds < 0 {
            return Err(anyhow::anyhow!("认领窗口不能为负数"));
        }

        if self.batch_limit <= 0 {
            return Err(anyhow::anyhow!("认领批次上限必须大于0"));
        }

        Ok(())
    }
}

/// 过期认领回收配置
///
/// 已认领但超过宽限期仍未started的任务会被释放回认领池，
/// 避免派发失败的任务永远滞留。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub claim_grace_seconds: i64,
    pub batch_limit: i64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
            claim_grace_seconds: 300,
            batch_limit: 100,
        }
    }
}

impl RecoveryConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval_seconds == 0 {
            return Err(anyhow::anyhow!("回收循环间隔必须大于0"));
        }

        if self.claim_grace_seconds <= 0 {
            return Err(anyhow::anyhow!("认领宽限期必须大于0"));
        }

        if self.batch_limit <= 0 {
            return Err(anyhow::anyhow!("回收批次上限必须大于0"));
        }

        Ok(())
    }
}

/// 协调器对Worker发起调用（心跳探测、任务下发）的网络参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub request_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 2000,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(anyhow::anyhow!("网络请求超时必须大于0"));
        }

        Ok(())
    }
}
