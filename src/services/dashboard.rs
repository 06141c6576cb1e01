//! 全局仪表盘

use crate::errors::AppError;
use crate::models::{fetch_errors, AlertQuery, AlertSeverity, EnrichedAlert, UNKNOWN_MACHINE};
use crate::sync::{enrich_alerts, fetcher, PollingSource, ViewState};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::ViewContext;

/// 仪表盘展示的告警数量
pub const DASHBOARD_ALERT_LIMIT: u32 = 10;

/// 按级别统计的告警概况
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertOverview {
    pub total: usize,
    pub by_severity: BTreeMap<AlertSeverity, usize>,
    pub machines_in_alert: usize,
}

impl AlertOverview {
    pub fn from_alerts(alerts: &[EnrichedAlert]) -> Self {
        let mut by_severity = BTreeMap::new();
        let mut machines = HashSet::new();
        for enriched in alerts {
            *by_severity.entry(enriched.alert.severity).or_insert(0) += 1;
            machines.insert(enriched.alert.machine_id);
        }
        Self {
            total: alerts.len(),
            by_severity,
            machines_in_alert: machines.len(),
        }
    }

    pub fn count(&self, severity: AlertSeverity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// 最近 10 条未解决告警，每 15 秒刷新
pub struct DashboardController {
    source: Arc<PollingSource<EnrichedAlert>>,
}

impl DashboardController {
    pub fn new(ctx: &ViewContext) -> Self {
        let api = ctx.api.clone();
        let dedupe = ctx.dedupe_lookups;
        let source = PollingSource::new(
            "dashboard",
            fetch_errors::GLOBAL_ALERTS,
            Some(ctx.polling.dashboard()),
            fetcher(move || {
                let api = api.clone();
                async move {
                    let query = AlertQuery::unresolved().with_limit(DASHBOARD_ALERT_LIMIT);
                    let alerts = api.list_alerts(&query).await?;
                    Ok(enrich_alerts(api.as_ref(), alerts, UNKNOWN_MACHINE, dedupe).await)
                }
            }),
        );
        Self { source }
    }

    pub fn source(&self) -> &Arc<PollingSource<EnrichedAlert>> {
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

    pub fn state(&self) -> ViewState<EnrichedAlert> {
        self.source.snapshot()
    }

    pub fn overview(&self) -> AlertOverview {
        AlertOverview::from_alerts(&self.source.snapshot().items)
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        self.source.deactivate();
    }
}
