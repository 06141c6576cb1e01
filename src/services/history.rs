//! 历史事件页面

use crate::errors::AppError;
use crate::models::{fetch_errors, AlertQuery, LogEntry, LogKind, ResolvedFilter, NOT_AVAILABLE};
use crate::sync::{enrich_alerts, fetcher, PollingSource, ViewState};
use std::sync::{Arc, Mutex};

use super::{ActivityLog, ViewContext};

/// 历史页面拉取的告警数量
pub const HISTORY_ALERT_LIMIT: u32 = 20;

/// 搜索与类型过滤
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub search: String,
    /// `None` 表示所有类型
    pub kind: Option<LogKind>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        entry.matches_search(&self.search) && self.kind.map_or(true, |kind| entry.kind == kind)
    }
}

/// 最近 20 条告警（机器名用 "N/A" 兜底）与本地操作记录合并，每 60 秒刷新
pub struct HistoryController {
    source: Arc<PollingSource<LogEntry>>,
    filter: Mutex<HistoryFilter>,
}

impl HistoryController {
    pub fn new(ctx: &ViewContext) -> Self {
        let api = ctx.api.clone();
        let activity: ActivityLog = ctx.activity.clone();
        let dedupe = ctx.dedupe_lookups;
        let source = PollingSource::new(
            "history",
            fetch_errors::HISTORY,
            Some(ctx.polling.history()),
            fetcher(move || {
                let api = api.clone();
                let activity = activity.clone();
                async move {
                    let query = AlertQuery::default()
                        .with_resolved(ResolvedFilter::All)
                        .with_limit(HISTORY_ALERT_LIMIT);
                    let alerts = api.list_alerts(&query).await?;
                    let enriched = enrich_alerts(api.as_ref(), alerts, NOT_AVAILABLE, dedupe).await;

                    let mut entries: Vec<LogEntry> =
                        enriched.into_iter().map(LogEntry::from).collect();
                    entries.extend(activity.entries());
                    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                    Ok(entries)
                }
            }),
        );
        Self {
            source,
            filter: Mutex::new(HistoryFilter::default()),
        }
    }

    pub fn source(&self) -> &Arc<PollingSource<LogEntry>> {
        &self.source
    }

    pub fn activate(&self) {
        self.source.activate();
    }

    pub fn deactivate(&self) {
        self.source.deactivate();
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        self.source.refresh().await
    }

    pub fn set_filter(&self, filter: HistoryFilter) {
        *self.filter.lock().unwrap_or_else(|e| e.into_inner()) = filter;
    }

    pub fn filter(&self) -> HistoryFilter {
        self.filter.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// 过滤后的视图（读取时计算，不修改原集合）
    pub fn state(&self) -> ViewState<LogEntry> {
        let filter = self.filter();
        self.source.snapshot().project(|entries| {
            entries
                .iter()
                .filter(|entry| filter.matches(entry))
                .cloned()
                .collect()
        })
    }
}

impl Drop for HistoryController {
    fn drop(&mut self) {
        self.source.deactivate();
    }
}
