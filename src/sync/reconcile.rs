//! 写操作后重新拉取

use crate::errors::AppError;
use std::future::Future;

use super::PollingSource;

/// 阻塞式提示（界面中的 alert 对话框）
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// 删除等破坏性操作前的确认
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// 只写日志的提示器
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(message = %message, "用户提示");
    }
}

/// 执行写操作，成功后刷新数据源
///
/// 失败时不修改任何状态，通过 `notifier` 提示 `failure_message` 并返回错误。
/// 刷新本身的失败由数据源记录到自己的状态中，不影响写操作的结果。
pub async fn mutate_then_refresh<T, R, Fut>(
    mutation: Fut,
    source: &PollingSource<T>,
    notifier: &dyn Notifier,
    failure_message: &str,
) -> Result<R, AppError>
where
    T: Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<R, AppError>>,
{
    match mutation.await {
        Ok(value) => {
            if let Err(e) = source.refresh().await {
                tracing::debug!(source = source.name(), error = %e, "写操作后刷新失败");
            }
            Ok(value)
        }
        Err(e) => {
            tracing::error!(source = source.name(), error = %e, "写操作失败");
            notifier.notify(failure_message);
            Err(e)
        }
    }
}
