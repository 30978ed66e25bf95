use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use hydra_core::{
    models::{ClaimedTask, TaskAssignment, WorkerRecord},
    traits::WorkerClient,
    CoordinatorError, CoordinatorResult,
};

/// 基于HTTP的Worker客户端
///
/// 超时设在客户端构建层，对心跳探测和任务下发统一生效；
/// 超时、连接错误和非2xx响应都映射为WorkerUnreachable。
pub struct HttpWorkerClient {
    http_client: reqwest::Client,
}

impl HttpWorkerClient {
    pub fn new(request_timeout: Duration) -> CoordinatorResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| CoordinatorError::Internal(format!("构建HTTP客户端失败: {e}")))?;

        Ok(Self { http_client })
    }

    fn endpoint_url(worker: &WorkerRecord, path: &str) -> String {
        format!("{}/{}", worker.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl WorkerClient for HttpWorkerClient {
    async fn heartbeat(&self, worker: &WorkerRecord) -> CoordinatorResult<()> {
        let url = Self::endpoint_url(worker, "heartbeat");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoordinatorError::worker_unreachable(&worker.id, e.to_string()))?;

        if !response.status().is_success() {
            return Err(CoordinatorError::worker_unreachable(
                &worker.id,
                format!("心跳探测返回 HTTP {}", response.status()),
            ));
        }

        debug!("Worker {} 心跳探测成功", worker.id);
        Ok(())
    }

    async fn submit(&self, worker: &WorkerRecord, task: &ClaimedTask) -> CoordinatorResult<()> {
        let url = Self::endpoint_url(worker, "submit");
        let assignment = TaskAssignment::from(task);

        let response = self
            .http_client
            .post(&url)
            .json(&assignment)
            .send()
            .await
            .map_err(|e| CoordinatorError::worker_unreachable(&worker.id, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoordinatorError::worker_unreachable(
                &worker.id,
                format!("任务下发被拒绝: HTTP {status} - {body}"),
            ));
        }

        debug!("任务 {} 已下发到Worker {}", task.id, worker.id);
        Ok(())
    }
}
