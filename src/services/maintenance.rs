//! 维护任务页面

use crate::errors::AppError;
use crate::models::{
    fetch_errors, mutation_errors, Machine, MachineRef, MaintenanceTask, ScheduleTaskForm,
    TaskStatus, MISSING_FIELDS_MESSAGE,
};
use crate::sync::{fetcher, mutate_then_refresh, PollingSource, ViewState};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::ViewContext;

/// 任务列表与计划表单所需的机器列表，均在挂载时拉取一次
pub struct MaintenanceController {
    ctx: ViewContext,
    tasks: Arc<PollingSource<MaintenanceTask>>,
    machines: Arc<PollingSource<Machine>>,
    /// `None` 即 "Tous"
    status_filter: Mutex<Option<TaskStatus>>,
}

impl MaintenanceController {
    pub fn new(ctx: ViewContext) -> Self {
        let api = ctx.api.clone();
        let tasks = PollingSource::new(
            "maintenance_tasks",
            fetch_errors::TASKS,
            None,
            fetcher(move || {
                let api = api.clone();
                async move { api.list_tasks().await }
            }),
        );
        let api = ctx.api.clone();
        let machines = PollingSource::new(
            "maintenance_machines",
            fetch_errors::MACHINES,
            None,
            fetcher(move || {
                let api = api.clone();
                async move { api.list_machines().await }
            }),
        );
        Self {
            ctx,
            tasks,
            machines,
            status_filter: Mutex::new(None),
        }
    }

    /// 拉取任务和机器；机器列表失败只记录日志，不影响任务展示
    pub async fn load(&self) -> Result<(), AppError> {
        let (tasks, machines) = tokio::join!(self.tasks.refresh(), self.machines.refresh());
        if let Err(e) = machines {
            tracing::warn!(error = %e, "计划表单的机器列表加载失败");
        }
        tasks
    }

    pub fn tasks(&self) -> &Arc<PollingSource<MaintenanceTask>> {
        &self.tasks
    }

    pub fn machines(&self) -> Vec<Machine> {
        self.machines.snapshot().items
    }

    pub fn set_status_filter(&self, status: Option<TaskStatus>) {
        *self.status_filter.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    pub fn status_filter(&self) -> Option<TaskStatus> {
        *self.status_filter.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 按状态过滤并按截止日期升序
    pub fn state(&self) -> ViewState<MaintenanceTask> {
        let status = self.status_filter();
        self.tasks.snapshot().project(|tasks| {
            let mut visible: Vec<MaintenanceTask> = tasks
                .iter()
                .filter(|task| status.map_or(true, |s| task.status == s))
                .cloned()
                .collect();
            visible.sort_by_key(|task| task.due_date);
            visible
        })
    }

    /// 计划新任务
    ///
    /// 表单不完整时提示并且不发送请求。
    pub async fn schedule(&self, form: ScheduleTaskForm) -> Result<MaintenanceTask, AppError> {
        let new_task = match form.into_new_task(&self.machines()) {
            Ok(task) => task,
            Err(e) => {
                self.ctx
                    .notifier
                    .notify(e.detail().unwrap_or(MISSING_FIELDS_MESSAGE));
                return Err(e);
            }
        };

        let created = mutate_then_refresh(
            self.ctx.api.create_task(&new_task),
            &self.tasks,
            self.ctx.notifier.as_ref(),
            mutation_errors::SCHEDULE_TASK,
        )
        .await?;

        tracing::info!(task_id = %created.id, machine = %new_task.machine_name, "维护任务已计划");
        self.ctx.activity.user_action(
            Some(MachineRef {
                id: new_task.machine_id,
                name: new_task.machine_name.clone(),
            }),
            format!("Tâche planifiée : {}", new_task.description),
        );
        Ok(created)
    }

    /// 标记任务为已完成
    pub async fn complete(&self, task_id: Uuid) -> Result<(), AppError> {
        let task = self.tasks.snapshot().items.into_iter().find(|t| t.id == task_id);

        mutate_then_refresh(
            self.ctx.api.complete_task(task_id),
            &self.tasks,
            self.ctx.notifier.as_ref(),
            mutation_errors::COMPLETE_TASK,
        )
        .await?;

        tracing::info!(task_id = %task_id, "维护任务已完成");
        let machine = task.as_ref().map(|t| MachineRef {
            id: t.machine_id,
            name: t.machine_name.clone(),
        });
        let label = task.map(|t| t.description).unwrap_or_else(|| task_id.to_string());
        self.ctx
            .activity
            .user_action(machine, format!("Tâche terminée : {}", label));
        Ok(())
    }
}
