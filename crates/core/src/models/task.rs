use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoordinatorError;

/// 调度任务
///
/// 生命周期时间戳由协调器逐步填充：claimed_at 在认领时设置且不回退
/// （唯一例外是回收服务释放过期认领），completed_at 和 failed_at 互斥。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub command: String,
    pub scheduled_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

/// 由时间戳推导出的任务生命周期阶段
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskLifecycle {
    Pending,
    Claimed,
    Started,
    Completed,
    Failed,
}

impl Task {
    pub fn lifecycle(&self) -> TaskLifecycle {
        if self.completed_at.is_some() {
            TaskLifecycle::Completed
        } else if self.failed_at.is_some() {
            TaskLifecycle::Failed
        } else if self.started_at.is_some() {
            TaskLifecycle::Started
        } else if self.claimed_at.is_some() {
            TaskLifecycle::Claimed
        } else {
            TaskLifecycle::Pending
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed_at.is_some()
    }

    pub fn is_terminal(&self) -> bool {
        self.completed_at.is_some() || self.failed_at.is_some()
    }
}

/// 认领查询返回的任务行，只携带派发所需的字段
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimedTask {
    pub id: i64,
    pub command: String,
}

/// 发送给Worker submit端点的请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub task_id: i64,
    pub command: String,
}

impl From<&ClaimedTask> for TaskAssignment {
    fn from(task: &ClaimedTask) -> Self {
        Self {
            task_id: task.id,
            command: task.command.clone(),
        }
    }
}

/// 可由状态回调写入的生命周期时间戳列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleField {
    Started,
    Completed,
    Failed,
}

impl LifecycleField {
    pub fn column_name(&self) -> &'static str {
        match self {
            LifecycleField::Started => "started_at",
            LifecycleField::Completed => "completed_at",
            LifecycleField::Failed => "failed_at",
        }
    }
}

/// Worker状态回调中允许的状态值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    Started,
    Completed,
    Failed,
}

impl StatusTransition {
    pub fn field(&self) -> LifecycleField {
        match self {
            StatusTransition::Started => LifecycleField::Started,
            StatusTransition::Completed => LifecycleField::Completed,
            StatusTransition::Failed => LifecycleField::Failed,
        }
    }
}

impl FromStr for StatusTransition {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STARTED" => Ok(StatusTransition::Started),
            "COMPLETED" => Ok(StatusTransition::Completed),
            "FAILED" => Ok(StatusTransition::Failed),
            _ => Err(CoordinatorError::invalid_status(s)),
        }
    }
}
