//! 单次操作的截止时间
//!
//! 一个请求创建一个 `Deadline`，并把它传给每一次存储与网络调用。
//! 超时后 future 被丢弃（取消），操作以 `AppError::Timeout` 失败，不做重试。

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::errors::AppError;

pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// 在截止时间内等待 `fut`
    pub async fn bound<F>(&self, what: &str, fut: F) -> Result<F::Output, AppError>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.at, fut).await.map_err(|_| {
            warn!("{} exceeded its deadline", what);
            AppError::timeout(format!("{} timed out", what))
        })
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::after(DEFAULT_OPERATION_TIMEOUT)
    }
}
