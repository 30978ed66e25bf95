use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use hydra_core::{
    models::{ClaimedTask, LifecycleField, Task},
    traits::TaskRepository,
    CoordinatorResult,
};

/// PostgreSQL任务存储
///
/// 认领的互斥性由单条带 FOR UPDATE SKIP LOCKED 的语句保证：
/// 并发认领方各自拿到不相交的行集，落败方只是看到零行。
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &sqlx::postgres::PgRow) -> CoordinatorResult<Task> {
        Ok(Task {
            id: row.try_get("id")?,
            command: row.try_get("command")?,
            scheduled_at: row.try_get("scheduled_at")?,
            claimed_at: row.try_get("claimed_at")?,
            started_at: row.try_get("started_at")?,
            completed_at: row.try_get("completed_at")?,
            failed_at: row.try_get("failed_at")?,
        })
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    #[instrument(skip(self))]
    async fn claim_due_tasks(
        &self,
        deadline: DateTime<Utc>,
        limit: i64,
    ) -> CoordinatorResult<Vec<ClaimedTask>> {
        // 子查询先锁定到期行（跳过已被并发认领方锁定的行），
        // 外层UPDATE原子地盖上claimed_at，最后按scheduled_at排序返回
        let rows = sqlx::query(
            r#"
            WITH due AS (
                SELECT id FROM tasks
                WHERE scheduled_at <= $1 AND claimed_at IS NULL
                ORDER BY scheduled_at ASC
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            ), claimed AS (
                UPDATE tasks SET claimed_at = $3
                FROM due
                WHERE tasks.id = due.id
                RETURNING tasks.id, tasks.command, tasks.scheduled_at
            )
            SELECT id, command FROM claimed ORDER BY scheduled_at ASC
            "#,
        )
        .bind(deadline)
        .bind(limit)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        let tasks = rows
            .iter()
            .map(|row| {
                Ok(ClaimedTask {
                    id: row.try_get("id")?,
                    command: row.try_get("command")?,
                })
            })
            .collect::<CoordinatorResult<Vec<_>>>()?;

        if !tasks.is_empty() {
            debug!("认领了 {} 个到期任务", tasks.len());
        }

        Ok(tasks)
    }

    async fn get_by_id(&self, id: i64) -> CoordinatorResult<Option<Task>> {
        let row = sqlx::query(
            r#"
            SELECT id, command, scheduled_at, claimed_at, started_at, completed_at, failed_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_task).transpose()
    }

    async fn set_lifecycle_timestamp(
        &self,
        id: i64,
        field: LifecycleField,
        at: DateTime<Utc>,
    ) -> CoordinatorResult<bool> {
        // 列名来自固定的枚举映射，不拼接外部输入
        let sql = format!("UPDATE tasks SET {} = $1 WHERE id = $2", field.column_name());

        let result = sqlx::query(&sql).bind(at).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn release_stale_claims(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> CoordinatorResult<u64> {
        let result = sqlx::query(
            r#"
            WITH stale AS (
                SELECT id FROM tasks
                WHERE claimed_at IS NOT NULL AND claimed_at < $1
                  AND started_at IS NULL AND completed_at IS NULL AND failed_at IS NULL
                ORDER BY claimed_at ASC
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            UPDATE tasks SET claimed_at = NULL
            FROM stale
            WHERE tasks.id = stale.id
            "#,
        )
        .bind(older_than)
        .bind(limit)
        .execute(&self.pool)
        .await?;

        let released = result.rows_affected();
        if released > 0 {
            debug!("释放了 {} 个过期认领", released);
        }

        Ok(released)
    }
}
