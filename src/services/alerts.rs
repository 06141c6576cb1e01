//! 告警页面

use crate::errors::AppError;
use crate::models::{
    fetch_errors, mutation_errors, AlertQuery, EnrichedAlert, MachineRef, ResolvedFilter,
    UNKNOWN_MACHINE,
};
use crate::sync::{enrich_alerts, fetcher, mutate_then_refresh, Fetcher, PollingSource, ViewState};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::ViewContext;

/// 告警列表：按已解决状态过滤，每 15 秒刷新，可解决单条告警
pub struct AlertsController {
    ctx: ViewContext,
    filter: Mutex<ResolvedFilter>,
    source: Arc<PollingSource<EnrichedAlert>>,
}

impl AlertsController {
    pub fn new(ctx: ViewContext) -> Self {
        let filter = ResolvedFilter::default();
        let source = PollingSource::new(
            "alerts",
            fetch_errors::ALERTS,
            Some(ctx.polling.alerts()),
            Self::fetcher_for(&ctx, filter),
        );
        Self {
            ctx,
            filter: Mutex::new(filter),
            source,
        }
    }

    fn fetcher_for(ctx: &ViewContext, filter: ResolvedFilter) -> Fetcher<EnrichedAlert> {
        let api = ctx.api.clone();
        let dedupe = ctx.dedupe_lookups;
        fetcher(move || {
            let api = api.clone();
            async move {
                let query = AlertQuery::default().with_resolved(filter);
                let alerts = api.list_alerts(&query).await?;
                Ok(enrich_alerts(api.as_ref(), alerts, UNKNOWN_MACHINE, dedupe).await)
            }
        })
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

    pub fn filter(&self) -> ResolvedFilter {
        *self.filter.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 切换过滤条件，变化时重新拉取
    pub fn set_filter(&self, filter: ResolvedFilter) {
        {
            let mut current = self.filter.lock().unwrap_or_else(|e| e.into_inner());
            if *current == filter {
                return;
            }
            *current = filter;
        }
        tracing::info!(filter = ?filter, "告警过滤条件变更");
        self.source.retarget(Self::fetcher_for(&self.ctx, filter));
    }

    /// 将告警标记为已解决，然后重新拉取
    pub async fn resolve(&self, alert_id: Uuid) -> Result<(), AppError> {
        let machine = self
            .state()
            .items
            .iter()
            .find(|a| a.alert.id == alert_id)
            .map(|a| MachineRef {
                id: a.alert.machine_id,
                name: a.machine_name.clone(),
            });

        mutate_then_refresh(
            self.ctx.api.resolve_alert(alert_id),
            &self.source,
            self.ctx.notifier.as_ref(),
            mutation_errors::RESOLVE_ALERT,
        )
        .await?;

        tracing::info!(alert_id = %alert_id, "告警已解决");
        self.ctx
            .activity
            .user_action(machine, format!("Alerte {} résolue.", alert_id));
        Ok(())
    }
}

impl Drop for AlertsController {
    fn drop(&mut self) {
        self.source.deactivate();
    }
}
