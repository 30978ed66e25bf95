use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::CoordinatorResult;
use crate::models::{ClaimedTask, LifecycleField, Task};

/// 任务存储的查询契约
///
/// 认领操作必须是原子且互斥的：多个协调器实例（或同一实例的重叠周期）
/// 并发认领时，每个到期任务恰好被一个调用方认领。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 原子地认领到期任务
    ///
    /// 返回 scheduled_at <= deadline 且尚未认领的任务，按 scheduled_at
    /// 升序排列，最多 limit 条；返回的行已被标记 claimed_at。
    /// 已被并发调用方锁定的行会被跳过而不是阻塞等待。
    async fn claim_due_tasks(
        &self,
        deadline: DateTime<Utc>,
        limit: i64,
    ) -> CoordinatorResult<Vec<ClaimedTask>>;

    async fn get_by_id(&self, id: i64) -> CoordinatorResult<Option<Task>>;

    /// 写入一个生命周期时间戳，返回false表示任务不存在
    ///
    /// 重复写入同一字段是幂等的（重新盖时间戳，不报错）。
    async fn set_lifecycle_timestamp(
        &self,
        id: i64,
        field: LifecycleField,
        at: DateTime<Utc>,
    ) -> CoordinatorResult<bool>;

    /// 释放过期的认领
    ///
    /// claimed_at早于older_than且从未started的任务会被释放回认领池，
    /// 返回释放的数量。终态任务不受影响。
    async fn release_stale_claims(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> CoordinatorResult<u64>;
}
