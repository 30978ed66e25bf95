use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Worker注册请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRegistration {
    pub worker_id: String,
    /// 心跳探测和任务下发的基础URL，例如 http://10.0.0.3:8081
    pub endpoint: String,
    /// 不透明的元数据（CPU数、内存等），协调器不解释其内容
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// 注册表中的Worker节点记录
///
/// 仅存在于内存中，协调器重启后由Worker重新注册重建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub id: String,
    pub endpoint: String,
    pub metadata: serde_json::Value,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat_at: DateTime<Utc>,
    pub missed_heartbeats: u32,
}

impl WorkerRecord {
    pub fn new(registration: WorkerRegistration) -> Self {
        let now = Utc::now();
        Self {
            id: registration.worker_id,
            endpoint: registration.endpoint,
            metadata: registration.metadata,
            registered_at: now,
            last_heartbeat_at: now,
            missed_heartbeats: 0,
        }
    }

    /// 探测成功或收到Worker主动心跳
    pub fn mark_heartbeat(&mut self, at: DateTime<Utc>) {
        self.last_heartbeat_at = at;
        self.missed_heartbeats = 0;
    }

    /// 探测失败，返回累计的连续未命中次数
    pub fn mark_missed(&mut self) -> u32 {
        self.missed_heartbeats += 1;
        self.missed_heartbeats
    }

    /// 上次心跳距now是否已超过给定秒数（pull模式的未命中判据）
    pub fn is_heartbeat_stale(&self, now: DateTime<Utc>, max_age_seconds: i64) -> bool {
        (now - self.last_heartbeat_at).num_seconds() > max_age_seconds
    }
}
