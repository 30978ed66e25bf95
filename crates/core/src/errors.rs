use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },
    #[error("Worker未找到: {id}")]
    WorkerNotFound { id: String },
    #[error("无效的任务状态: {status}")]
    InvalidStatusTransition { status: String },
    #[error("没有可用的Worker节点")]
    NoWorkersAvailable,
    #[error("Worker {worker_id} 不可达: {reason}")]
    WorkerUnreachable { worker_id: String, reason: String },
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

impl CoordinatorError {
    pub fn task_not_found(id: i64) -> Self {
        Self::TaskNotFound { id }
    }
    pub fn worker_not_found<S: Into<String>>(id: S) -> Self {
        Self::WorkerNotFound { id: id.into() }
    }
    pub fn invalid_status<S: Into<String>>(status: S) -> Self {
        Self::InvalidStatusTransition {
            status: status.into(),
        }
    }
    pub fn worker_unreachable<I: Into<String>, R: Into<String>>(worker_id: I, reason: R) -> Self {
        Self::WorkerUnreachable {
            worker_id: worker_id.into(),
            reason: reason.into(),
        }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// 后台循环中的错误是否可以留待下一个周期重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoordinatorError::Database(_)
                | CoordinatorError::WorkerUnreachable { .. }
                | CoordinatorError::NoWorkersAvailable
        )
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoordinatorError::Configuration(_) | CoordinatorError::Internal(_)
        )
    }
}
