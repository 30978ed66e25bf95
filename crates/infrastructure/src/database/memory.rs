use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use hydra_core::{
    models::{ClaimedTask, LifecycleField, Task},
    traits::TaskRepository,
    CoordinatorResult,
};

/// 内存任务存储
///
/// 与PostgreSQL实现提供相同的原子认领契约：整张表由一把锁守护，
/// 认领的查询和标记在同一临界区内完成。适用于测试和嵌入式部署。
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    inner: Mutex<MemoryStore>,
}

#[derive(Debug, Default)]
struct MemoryStore {
    next_id: i64,
    tasks: Vec<Task>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一个待认领任务，返回分配的id（测试和嵌入式场景使用）
    pub fn insert(&self, command: &str, scheduled_at: DateTime<Utc>) -> i64 {
        let mut store = self.inner.lock().unwrap();
        store.next_id += 1;
        let id = store.next_id;
        store.tasks.push(Task {
            id,
            command: command.to_string(),
            scheduled_at,
            claimed_at: None,
            started_at: None,
            completed_at: None,
            failed_at: None,
        });
        id
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn claim_due_tasks(
        &self,
        deadline: DateTime<Utc>,
        limit: i64,
    ) -> CoordinatorResult<Vec<ClaimedTask>> {
        let mut store = self.inner.lock().unwrap();
        let now = Utc::now();

        let mut due: Vec<usize> = store
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.claimed_at.is_none() && task.scheduled_at <= deadline)
            .map(|(index, _)| index)
            .collect();
        due.sort_by_key(|&index| store.tasks[index].scheduled_at);
        due.truncate(limit.max(0) as usize);

        let claimed: Vec<ClaimedTask> = due
            .into_iter()
            .map(|index| {
                let task = &mut store.tasks[index];
                task.claimed_at = Some(now);
                ClaimedTask {
                    id: task.id,
                    command: task.command.clone(),
                }
            })
            .collect();

        if !claimed.is_empty() {
            debug!("认领了 {} 个到期任务", claimed.len());
        }

        Ok(claimed)
    }

    async fn get_by_id(&self, id: i64) -> CoordinatorResult<Option<Task>> {
        let store = self.inner.lock().unwrap();
        Ok(store.tasks.iter().find(|task| task.id == id).cloned())
    }

    async fn set_lifecycle_timestamp(
        &self,
        id: i64,
        field: LifecycleField,
        at: DateTime<Utc>,
    ) -> CoordinatorResult<bool> {
        let mut store = self.inner.lock().unwrap();
        let Some(task) = store.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(false);
        };

        match field {
            LifecycleField::Started => task.started_at = Some(at),
            LifecycleField::Completed => task.completed_at = Some(at),
            LifecycleField::Failed => task.failed_at = Some(at),
        }

        Ok(true)
    }

    async fn release_stale_claims(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> CoordinatorResult<u64> {
        let mut store = self.inner.lock().unwrap();
        let mut released = 0u64;

        for task in store.tasks.iter_mut() {
            if released >= limit.max(0) as u64 {
                break;
            }
            let stale = matches!(task.claimed_at, Some(at) if at < older_than)
                && task.started_at.is_none()
                && task.completed_at.is_none()
                && task.failed_at.is_none();
            if stale {
                task.claimed_at = None;
                released += 1;
            }
        }

        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_claim_respects_window_order_and_limit() {
        let repo = MemoryTaskRepository::new();
        let now = Utc::now();

        let late = repo.insert("task-late", now + Duration::seconds(10));
        let early = repo.insert("task-early", now - Duration::seconds(10));
        let future = repo.insert("task-future", now + Duration::seconds(3600));

        let claimed = repo
            .claim_due_tasks(now + Duration::seconds(30), 10)
            .await
            .unwrap();

        // 窗口外的任务不被认领，窗口内按scheduled_at升序
        let ids: Vec<i64> = claimed.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![early, late]);

        let future_task = repo.get_by_id(future).await.unwrap().unwrap();
        assert!(future_task.claimed_at.is_none());

        // 已认领的任务不会被二次认领
        let again = repo
            .claim_due_tasks(now + Duration::seconds(30), 10)
            .await
            .unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_claim_batch_limit() {
        let repo = MemoryTaskRepository::new();
        let now = Utc::now();
        for i in 0..5 {
            repo.insert(&format!("task-{i}"), now - Duration::seconds(i));
        }

        let claimed = repo.claim_due_tasks(now, 3).await.unwrap();
        assert_eq!(claimed.len(), 3);

        let rest = repo.claim_due_tasks(now, 10).await.unwrap();
        assert_eq!(rest.len(), 2);
    }

    #[tokio::test]
    async fn test_set_lifecycle_timestamp() {
        let repo = MemoryTaskRepository::new();
        let id = repo.insert("echo hi", Utc::now());

        let at = Utc::now();
        assert!(repo
            .set_lifecycle_timestamp(id, LifecycleField::Started, at)
            .await
            .unwrap());
        let task = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(task.started_at, Some(at));

        // 未知任务返回false而不是错误
        assert!(!repo
            .set_lifecycle_timestamp(9999, LifecycleField::Completed, at)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_release_stale_claims_skips_started_tasks() {
        let repo = MemoryTaskRepository::new();
        let now = Utc::now();

        let stale = repo.insert("stale", now - Duration::seconds(600));
        let started = repo.insert("started", now - Duration::seconds(600));
        repo.claim_due_tasks(now, 10).await.unwrap();
        repo.set_lifecycle_timestamp(started, LifecycleField::Started, now)
            .await
            .unwrap();

        let released = repo
            .release_stale_claims(now + Duration::seconds(1), 100)
            .await
            .unwrap();
        assert_eq!(released, 1);

        let stale_task = repo.get_by_id(stale).await.unwrap().unwrap();
        assert!(stale_task.claimed_at.is_none());
        let started_task = repo.get_by_id(started).await.unwrap().unwrap();
        assert!(started_task.claimed_at.is_some());
    }
}
