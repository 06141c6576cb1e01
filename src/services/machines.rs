//! 机器列表与机器详情页面

use crate::errors::AppError;
use crate::models::{
    fetch_errors, series, Alert, Machine, MachineHealth, MachineRef, SensorDataPoint,
    SensorDataQuery, SensorMetric, SensorSummary, ThresholdBreach,
};
use crate::sync::{fetcher, Fetcher, PollingSource, Selection, ViewState};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use uuid::Uuid;

use super::ViewContext;

/// 机器列表：挂载时拉取一次，维护选中项
pub struct MachineListController {
    source: Arc<PollingSource<Machine>>,
    selection: Mutex<Selection<Uuid>>,
    selected: watch::Sender<Option<MachineRef>>,
}

impl MachineListController {
    pub fn new(ctx: &ViewContext) -> Self {
        let api = ctx.api.clone();
        let source = PollingSource::new(
            "machines",
            fetch_errors::MACHINES,
            None,
            fetcher(move || {
                let api = api.clone();
                async move { api.list_machines().await }
            }),
        );
        let (selected, _) = watch::channel(None);
        Self {
            source,
            selection: Mutex::new(Selection::new()),
            selected,
        }
    }

    pub fn source(&self) -> &Arc<PollingSource<Machine>> {
        &self.source
    }

    pub fn state(&self) -> ViewState<Machine> {
        self.source.snapshot()
    }

    /// 拉取列表并调整选中项
    pub async fn load(&self) -> Result<(), AppError> {
        let result = self.source.refresh().await;
        let machines = self.source.snapshot().items;
        let changed = self
            .selection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .reconcile(&machines, |m| m.id);
        if changed {
            self.publish(&machines);
        }
        result
    }

    /// 用户点击某台机器
    pub fn select(&self, id: Uuid) -> Result<(), AppError> {
        let machines = self.source.snapshot().items;
        if !machines.iter().any(|m| m.id == id) {
            return Err(AppError::NotFound(format!("机器不存在: {}", id)));
        }
        let changed = self
            .selection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .select(Some(id));
        if changed {
            self.publish(&machines);
        }
        Ok(())
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selection.lock().unwrap_or_else(|e| e.into_inner()).current()
    }

    pub fn selected_machine(&self) -> Option<Machine> {
        let id = self.selected_id()?;
        self.source.snapshot().items.into_iter().find(|m| m.id == id)
    }

    /// 选中项变化通知
    pub fn selection_changes(&self) -> watch::Receiver<Option<MachineRef>> {
        self.selected.subscribe()
    }

    fn publish(&self, machines: &[Machine]) {
        let current = self
            .selected_id()
            .and_then(|id| machines.iter().find(|m| m.id == id))
            .map(Machine::to_ref);
        tracing::debug!(machine = ?current.as_ref().map(|m| &m.name), "选中机器变更");
        self.selected.send_replace(current);
    }
}

/// 机器详情：传感器数据与未解决告警，各自每 10 秒刷新
pub struct MachineDetailsController {
    ctx: ViewContext,
    machine: Mutex<Option<Machine>>,
    sensor_data: Arc<PollingSource<SensorDataPoint>>,
    alerts: Arc<PollingSource<Alert>>,
}

impl MachineDetailsController {
    pub fn new(ctx: ViewContext) -> Self {
        let sensor_data = PollingSource::new(
            "sensor_data",
            fetch_errors::SENSOR_DATA,
            Some(ctx.polling.sensor_data()),
            Self::sensor_fetcher(&ctx, None),
        );
        let alerts = PollingSource::new(
            "machine_alerts",
            fetch_errors::MACHINE_ALERTS,
            Some(ctx.polling.machine_alerts()),
            Self::alerts_fetcher(&ctx, None),
        );
        Self {
            ctx,
            machine: Mutex::new(None),
            sensor_data,
            alerts,
        }
    }

    fn sensor_fetcher(ctx: &ViewContext, machine_id: Option<Uuid>) -> Fetcher<SensorDataPoint> {
        let api = ctx.api.clone();
        fetcher(move || {
            let api = api.clone();
            async move {
                match machine_id {
                    Some(id) => api.list_sensor_data(id, &SensorDataQuery::trailing_window()).await,
                    None => Ok(Vec::new()),
                }
            }
        })
    }

    fn alerts_fetcher(ctx: &ViewContext, machine_id: Option<Uuid>) -> Fetcher<Alert> {
        let api = ctx.api.clone();
        fetcher(move || {
            let api = api.clone();
            async move {
                let Some(id) = machine_id else {
                    return Ok(Vec::new());
                };
                let alerts = api.list_machine_alerts(id).await?;
                Ok(alerts.into_iter().filter(|a| !a.is_resolved).collect())
            }
        })
    }

    /// 切换展示的机器，两个数据源都重新开始
    pub fn set_machine(&self, machine: Option<Machine>) {
        let id = machine.as_ref().map(|m| m.id);
        {
            let mut current = self.machine.lock().unwrap_or_else(|e| e.into_inner());
            if current.as_ref().map(|m| m.id) == id {
                *current = machine;
                return;
            }
            *current = machine;
        }
        tracing::info!(machine_id = ?id, "详情页切换机器");
        self.sensor_data.retarget(Self::sensor_fetcher(&self.ctx, id));
        self.alerts.retarget(Self::alerts_fetcher(&self.ctx, id));
    }

    pub fn machine(&self) -> Option<Machine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn activate(&self) {
        self.sensor_data.activate();
        self.alerts.activate();
    }

    pub fn deactivate(&self) {
        self.sensor_data.deactivate();
        self.alerts.deactivate();
    }

    /// 两个数据源各刷新一次；任一失败时返回第一个错误
    pub async fn refresh(&self) -> Result<(), AppError> {
        let (data, alerts) = tokio::join!(self.sensor_data.refresh(), self.alerts.refresh());
        data.and(alerts)
    }

    pub fn sensor_data(&self) -> &Arc<PollingSource<SensorDataPoint>> {
        &self.sensor_data
    }

    pub fn alerts(&self) -> &Arc<PollingSource<Alert>> {
        &self.alerts
    }

    /// 总体状态：活跃告警中的最高级别
    pub fn health(&self) -> MachineHealth {
        MachineHealth::from_alerts(&self.alerts.snapshot().items)
    }

    pub fn summary(&self) -> Option<SensorSummary> {
        SensorSummary::from_points(&self.sensor_data.snapshot().items)
    }

    pub fn series(&self, metric: SensorMetric) -> Vec<(DateTime<Utc>, f64)> {
        series(&self.sensor_data.snapshot().items, metric)
    }

    /// 最新读数超出阈值的项
    pub fn threshold_breaches(&self) -> Vec<ThresholdBreach> {
        let Some(machine) = self.machine() else {
            return Vec::new();
        };
        let points = self.sensor_data.snapshot().items;
        points
            .iter()
            .max_by_key(|p| p.timestamp)
            .map(|latest| machine.thresholds_config.breaches(latest))
            .unwrap_or_default()
    }
}

impl Drop for MachineDetailsController {
    fn drop(&mut self) {
        self.deactivate();
    }
}
