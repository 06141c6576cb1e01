//! 轮询数据源

use crate::errors::AppError;
use chrono::Utc;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{ViewLifetime, ViewState};

/// 拉取函数：由当前过滤条件构造请求
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<T>, AppError>> + Send + Sync>;

/// 把异步闭包包装为 `Fetcher`
pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, AppError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}

struct SourceInner<T> {
    fetcher: Fetcher<T>,
    lifetime: ViewLifetime,
    active: bool,
    task: Option<JoinHandle<()>>,
}

/// 一个页面数据集的轮询源
///
/// 激活后立即拉取一次，然后按固定间隔重复；`interval` 为 `None` 时只拉取一次。
/// 同一数据源内的拉取周期串行执行，错过的 tick 顺延。
pub struct PollingSource<T> {
    name: &'static str,
    error_message: &'static str,
    interval: Option<Duration>,
    state: watch::Sender<ViewState<T>>,
    inner: Mutex<SourceInner<T>>,
    gate: tokio::sync::Mutex<()>,
}

impl<T> PollingSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        name: &'static str,
        error_message: &'static str,
        interval: Option<Duration>,
        fetcher: Fetcher<T>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(ViewState::default());
        Arc::new(Self {
            name,
            error_message,
            interval,
            state,
            inner: Mutex::new(SourceInner {
                fetcher,
                lifetime: ViewLifetime::new(),
                active: false,
                task: None,
            }),
            gate: tokio::sync::Mutex::new(()),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.subscribe()
    }

    /// 当前状态的快照
    pub fn snapshot(&self) -> ViewState<T> {
        self.state.borrow().clone()
    }

    /// 开始轮询（已激活时无操作）
    pub fn activate(self: &Arc<Self>) {
        let mut inner = self.lock();
        if inner.active {
            return;
        }
        inner.active = true;
        tracing::debug!(source = self.name, interval = ?self.interval, "数据源激活");
        self.spawn_loop(&mut inner);
    }

    /// 停止轮询并丢弃进行中的请求
    pub fn deactivate(&self) {
        let mut inner = self.lock();
        inner.lifetime.cancel();
        inner.lifetime = ViewLifetime::new();
        inner.task = None;
        if inner.active {
            tracing::debug!(source = self.name, "数据源停用");
        }
        inner.active = false;
        drop(inner);
        self.state.send_modify(|state| state.loading = false);
    }

    /// 依赖变化（过滤条件、所选机器）
    ///
    /// 旧生命周期被取消，其响应不再生效；状态回到初始加载阶段；处于激活状态时立即重新开始轮询。
    pub fn retarget(self: &Arc<Self>, fetcher: Fetcher<T>) {
        let mut inner = self.lock();
        inner.lifetime.cancel();
        inner.lifetime = ViewLifetime::new();
        inner.task = None;
        inner.fetcher = fetcher;
        self.state.send_replace(ViewState::default());
        tracing::debug!(source = self.name, "数据源切换查询条件");
        if inner.active {
            self.spawn_loop(&mut inner);
        }
    }

    /// 立即执行一个拉取周期并等待其完成
    pub async fn refresh(&self) -> Result<(), AppError> {
        let (fetcher, lifetime) = {
            let inner = self.lock();
            (inner.fetcher.clone(), inner.lifetime.clone())
        };
        self.cycle(&fetcher, &lifetime).await
    }

    fn lock(&self) -> MutexGuard<'_, SourceInner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn spawn_loop(self: &Arc<Self>, inner: &mut SourceInner<T>) {
        let source = Arc::clone(self);
        let fetcher = inner.fetcher.clone();
        let lifetime = inner.lifetime.clone();
        inner.task = Some(tokio::spawn(async move {
            source.run(fetcher, lifetime).await;
        }));
    }

    async fn run(&self, fetcher: Fetcher<T>, lifetime: ViewLifetime) {
        let Some(period) = self.interval else {
            let _ = self.cycle(&fetcher, &lifetime).await;
            return;
        };

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = lifetime.cancelled() => break,
                _ = ticker.tick() => {
                    let _ = self.cycle(&fetcher, &lifetime).await;
                }
            }
        }
        tracing::trace!(source = self.name, "轮询循环结束");
    }

    async fn cycle(&self, fetcher: &Fetcher<T>, lifetime: &ViewLifetime) -> Result<(), AppError> {
        let _gate = lifetime.run(self.gate.lock()).await?;
        self.state.send_modify(|state| state.loading = true);

        match lifetime.run(fetcher()).await {
            Err(cancelled) => {
                tracing::debug!(source = self.name, "生命周期已结束，丢弃响应");
                Err(cancelled)
            }
            Ok(Ok(items)) => {
                tracing::debug!(source = self.name, count = items.len(), "数据加载成功");
                self.state.send_modify(|state| {
                    state.items = items;
                    state.loading = false;
                    state.error = None;
                    state.last_updated = Some(Utc::now());
                    state.has_loaded = true;
                });
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(source = self.name, error = %e, "数据加载失败");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(self.error_message.to_string());
                    state.has_loaded = true;
                });
                Err(e)
            }
        }
    }
}
