//! 视图生命周期（取消令牌）

use crate::errors::AppError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// 一次激活对应的取消令牌
///
/// 克隆共享同一状态；`cancel()` 之后，经由 `run` 执行的请求立即以 `Cancelled` 结束。
#[derive(Debug, Clone)]
pub struct ViewLifetime {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl ViewLifetime {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// 等待取消
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// 在生命周期内执行 future，取消时丢弃
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, AppError> {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(AppError::Cancelled),
            output = future => {
                if self.is_cancelled() {
                    Err(AppError::Cancelled)
                } else {
                    Ok(output)
                }
            }
        }
    }
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}
