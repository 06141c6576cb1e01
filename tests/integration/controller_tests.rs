//! 页面控制器集成测试（内存后端）

use machina::models::{
    fetch_errors, mutation_errors, notices, AlertSeverity, LogKind, MachineHealth,
    ResolvedFilter, ScheduleTaskForm, TaskPriority, TaskStatus, UserForm, UserRole,
    MISSING_FIELDS_MESSAGE, NOT_AVAILABLE, RETRAIN_PATH_REQUIRED, UNKNOWN_MACHINE,
};
use machina::services::{
    AlertsController, DashboardController, HistoryController, HistoryFilter, MLModelsController,
    MachineDetailsController, MachineListController, MaintenanceController,
    SimulatedModelProvider, UsersController, DASHBOARD_ALERT_LIMIT, HISTORY_ALERT_LIMIT,
};
use machina::AppError;
use std::sync::Arc;

use crate::helpers::{alert, fixed_uuid, machine, reading, task, user, FixedConfirmer, Harness};
use crate::mocks::FakeApi;
use crate::{assert_err, assert_ok};

mod alerts {
    use super::*;

    fn two_machine_api() -> FakeApi {
        let m1 = machine(1, "Presse hydraulique");
        let m2 = machine(2, "Tour CNC");
        let alerts = vec![
            alert(10, m1.id, AlertSeverity::Critique, 5),
            alert(11, m2.id, AlertSeverity::Avertissement, 10),
        ];
        FakeApi::new().with_machines(vec![m1, m2]).with_alerts(alerts)
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_items() {
        let h = Harness::new(two_machine_api());
        let controller = AlertsController::new(h.ctx.clone());

        assert_ok!(controller.refresh().await);
        assert_eq!(controller.state().items.len(), 2);

        h.api.fail_lists(true);
        assert_err!(controller.refresh().await);

        let state = controller.state();
        assert_eq!(state.items.len(), 2, "加载失败时应保留旧数据");
        assert_eq!(state.error.as_deref(), Some(fetch_errors::ALERTS));

        h.api.fail_lists(false);
        assert_ok!(controller.refresh().await);
        assert_eq!(controller.state().error, None, "成功后应清除错误");
    }

    #[tokio::test]
    async fn test_resolve_affects_only_that_alert() {
        let h = Harness::new(two_machine_api());
        let controller = AlertsController::new(h.ctx.clone());
        assert_ok!(controller.refresh().await);

        assert_ok!(controller.resolve(fixed_uuid(10)).await);

        let backend = h.api.alerts();
        assert!(backend.iter().find(|a| a.id == fixed_uuid(10)).unwrap().is_resolved);
        assert!(!backend.iter().find(|a| a.id == fixed_uuid(11)).unwrap().is_resolved);

        let visible: Vec<_> = controller.state().items.iter().map(|a| a.alert.id).collect();
        assert_eq!(visible, vec![fixed_uuid(11)], "解决后重新拉取，未解决列表只剩另一条");
        assert_eq!(h.api.calls("list_alerts"), 2);
        assert!(h.notifier.messages().is_empty());

        let activity = h.ctx.activity.entries();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].kind, LogKind::UserAction);
        assert_eq!(activity[0].machine_name.as_deref(), Some("Presse hydraulique"));
    }

    #[tokio::test]
    async fn test_failed_resolve_notifies_and_keeps_state() {
        let h = Harness::new(two_machine_api());
        let controller = AlertsController::new(h.ctx.clone());
        assert_ok!(controller.refresh().await);

        h.api.fail_mutations(true);
        assert_err!(controller.resolve(fixed_uuid(10)).await);

        assert_eq!(h.notifier.messages(), vec![mutation_errors::RESOLVE_ALERT.to_string()]);
        assert_eq!(controller.state().items.len(), 2);
        assert_eq!(h.api.calls("list_alerts"), 1, "失败的写操作不应触发重新拉取");
        assert!(h.ctx.activity.is_empty());
    }

    #[tokio::test]
    async fn test_failed_lookup_uses_sentinel() {
        let h = Harness::new(two_machine_api());
        h.api.fail_machine(fixed_uuid(2));
        let controller = AlertsController::new(h.ctx.clone());

        assert_ok!(controller.refresh().await);

        let state = controller.state();
        let name_of = |id| {
            state
                .items
                .iter()
                .find(|a| a.alert.id == id)
                .map(|a| a.machine_name.clone())
                .unwrap()
        };
        assert_eq!(name_of(fixed_uuid(10)), "Presse hydraulique");
        assert_eq!(name_of(fixed_uuid(11)), UNKNOWN_MACHINE, "单条关联查询失败只影响该条");
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_filter_change_refetches_with_new_query() {
        let mut resolved = alert(12, fixed_uuid(1), AlertSeverity::Urgence, 20);
        resolved.is_resolved = true;
        let h = Harness::new(
            two_machine_api().with_alerts(vec![alert(10, fixed_uuid(1), AlertSeverity::Critique, 5), resolved]),
        );
        let controller = AlertsController::new(h.ctx.clone());
        assert_ok!(controller.refresh().await);
        assert_eq!(controller.state().items.len(), 1);

        controller.set_filter(ResolvedFilter::All);
        assert!(!controller.state().has_loaded, "切换条件后状态应重置");
        assert_ok!(controller.refresh().await);

        assert_eq!(controller.state().items.len(), 2);
        let queries = h.api.alert_queries();
        assert_eq!(queries.last().unwrap().resolved, ResolvedFilter::All);
        assert_eq!(queries.last().unwrap().to_params(), Vec::<(&str, String)>::new());
    }

    #[tokio::test]
    async fn test_lookup_dedupe_is_opt_in() {
        let m1 = machine(1, "Presse");
        let alerts = vec![
            alert(10, m1.id, AlertSeverity::Critique, 1),
            alert(11, m1.id, AlertSeverity::Critique, 2),
            alert(12, m1.id, AlertSeverity::Critique, 3),
        ];

        let h = Harness::new(FakeApi::new().with_machines(vec![m1.clone()]).with_alerts(alerts.clone()));
        let controller = AlertsController::new(h.ctx.clone());
        assert_ok!(controller.refresh().await);
        assert_eq!(h.api.calls("get_machine"), 3, "默认每条记录查询一次");

        let mut h = Harness::new(FakeApi::new().with_machines(vec![m1]).with_alerts(alerts));
        h.ctx.dedupe_lookups = true;
        let controller = AlertsController::new(h.ctx.clone());
        assert_ok!(controller.refresh().await);
        assert_eq!(h.api.calls("get_machine"), 1);
        assert!(controller.state().items.iter().all(|a| a.machine_name == "Presse"));
    }
}

mod dashboard {
    use super::*;

    #[tokio::test]
    async fn test_recent_unresolved_alerts_with_overview() {
        let m1 = machine(1, "Presse");
        let alerts = (0..12)
            .map(|i| alert(20 + i, m1.id, AlertSeverity::Critique, i as i64))
            .collect();
        let h = Harness::new(FakeApi::new().with_machines(vec![m1]).with_alerts(alerts));
        let controller = DashboardController::new(&h.ctx);

        assert_ok!(controller.refresh().await);

        let query = h.api.alert_queries().pop().unwrap();
        assert_eq!(query.resolved, ResolvedFilter::Unresolved);
        assert_eq!(query.limit, Some(DASHBOARD_ALERT_LIMIT));

        let overview = controller.overview();
        assert_eq!(overview.total, 10);
        assert_eq!(overview.count(AlertSeverity::Critique), 10);
        assert_eq!(overview.machines_in_alert, 1);
    }

    #[tokio::test]
    async fn test_failure_uses_global_message() {
        let h = Harness::new(FakeApi::new());
        h.api.fail_lists(true);
        let controller = DashboardController::new(&h.ctx);

        assert_err!(controller.refresh().await);
        assert_eq!(controller.state().error.as_deref(), Some(fetch_errors::GLOBAL_ALERTS));
    }
}

mod history {
    use super::*;

    #[tokio::test]
    async fn test_merges_alerts_and_local_actions() {
        let m1 = machine(1, "Presse");
        let mut old = alert(30, m1.id, AlertSeverity::Avertissement, 60);
        old.is_resolved = true;
        let recent = alert(31, fixed_uuid(9), AlertSeverity::Critique, 5);
        let h = Harness::new(FakeApi::new().with_machines(vec![m1]).with_alerts(vec![old, recent]));
        h.api.fail_machine(fixed_uuid(9));
        h.ctx.activity.system("Synchronisation terminée.");

        let controller = HistoryController::new(&h.ctx);
        assert_ok!(controller.refresh().await);

        let query = h.api.alert_queries().pop().unwrap();
        assert_eq!(query.resolved, ResolvedFilter::All);
        assert_eq!(query.limit, Some(HISTORY_ALERT_LIMIT));

        let entries = controller.state().items;
        assert_eq!(entries.len(), 3);
        assert!(
            entries.windows(2).all(|w| w[0].timestamp >= w[1].timestamp),
            "应按时间倒序排列"
        );
        assert_eq!(entries[0].kind, LogKind::System);
        assert_eq!(entries[1].machine_name.as_deref(), Some(NOT_AVAILABLE));
        assert_eq!(entries[2].machine_name.as_deref(), Some("Presse"));
    }

    #[tokio::test]
    async fn test_filter_applies_without_refetch() {
        let m1 = machine(1, "Presse");
        let h = Harness::new(
            FakeApi::new()
                .with_machines(vec![m1.clone()])
                .with_alerts(vec![alert(30, m1.id, AlertSeverity::Critique, 5)]),
        );
        h.ctx.activity.user_action(Some(m1.to_ref()), "Tâche planifiée : Graissage");
        let controller = HistoryController::new(&h.ctx);
        assert_ok!(controller.refresh().await);

        controller.set_filter(HistoryFilter {
            search: "GRAISSAGE".to_string(),
            kind: None,
        });
        assert_eq!(controller.state().items.len(), 1);

        controller.set_filter(HistoryFilter {
            search: String::new(),
            kind: Some(LogKind::Alert),
        });
        let visible = controller.state().items;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].kind, LogKind::Alert);
        assert_eq!(h.api.calls("list_alerts"), 1, "过滤只在本地计算");
    }
}

mod maintenance {
    use super::*;

    fn api_with_tasks() -> FakeApi {
        let m1 = machine(1, "Presse");
        let tasks = vec![
            task(40, &m1, TaskStatus::Pending, (2024, 6, 15)),
            task(41, &m1, TaskStatus::Done, (2024, 4, 1)),
            task(42, &m1, TaskStatus::Pending, (2024, 5, 1)),
        ];
        FakeApi::new().with_machines(vec![m1]).with_tasks(tasks)
    }

    fn form() -> ScheduleTaskForm {
        ScheduleTaskForm {
            machine_id: Some(fixed_uuid(1)),
            description: "Vidange".to_string(),
            due_date: chrono::NaiveDate::from_ymd_opt(2024, 7, 1),
            priority: TaskPriority::Elevee,
            assigned_to: "Luc Besson".to_string(),
        }
    }

    #[tokio::test]
    async fn test_filter_and_sort_by_due_date() {
        let h = Harness::new(api_with_tasks());
        let controller = MaintenanceController::new(h.ctx.clone());
        assert_ok!(controller.load().await);

        let all: Vec<_> = controller.state().items.iter().map(|t| t.id).collect();
        assert_eq!(all, vec![fixed_uuid(41), fixed_uuid(42), fixed_uuid(40)]);

        controller.set_status_filter(Some(TaskStatus::Pending));
        let pending: Vec<_> = controller.state().items.iter().map(|t| t.id).collect();
        assert_eq!(pending, vec![fixed_uuid(42), fixed_uuid(40)]);
    }

    #[tokio::test]
    async fn test_schedule_creates_exactly_one_pending_task() {
        let h = Harness::new(api_with_tasks());
        let controller = MaintenanceController::new(h.ctx.clone());
        assert_ok!(controller.load().await);

        let created = assert_ok!(controller.schedule(form()).await);

        assert_eq!(created.status, TaskStatus::Pending);
        assert_eq!(created.machine_name, "Presse");
        assert_eq!(h.api.calls("create_task"), 1);
        assert_eq!(h.api.tasks().len(), 4);
        assert_eq!(controller.state().items.len(), 4, "计划成功后应重新拉取");
        assert_eq!(h.api.calls("list_tasks"), 2);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_notifies_without_request() {
        let h = Harness::new(api_with_tasks());
        let controller = MaintenanceController::new(h.ctx.clone());
        assert_ok!(controller.load().await);

        let err = assert_err!(
            controller
                .schedule(ScheduleTaskForm {
                    assigned_to: " ".to_string(),
                    ..form()
                })
                .await
        );

        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(h.notifier.messages(), vec![MISSING_FIELDS_MESSAGE.to_string()]);
        assert_eq!(h.api.calls("create_task"), 0, "表单不完整时不应发送请求");
        assert_eq!(h.api.tasks().len(), 3);
    }

    #[tokio::test]
    async fn test_complete_task() {
        let h = Harness::new(api_with_tasks());
        let controller = MaintenanceController::new(h.ctx.clone());
        assert_ok!(controller.load().await);

        assert_ok!(controller.complete(fixed_uuid(40)).await);

        let updated = controller
            .state()
            .items
            .into_iter()
            .find(|t| t.id == fixed_uuid(40))
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(h.ctx.activity.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_complete_notifies() {
        let h = Harness::new(api_with_tasks());
        let controller = MaintenanceController::new(h.ctx.clone());
        assert_ok!(controller.load().await);
        h.api.fail_mutations(true);

        assert_err!(controller.complete(fixed_uuid(40)).await);
        assert_eq!(h.notifier.messages(), vec![mutation_errors::COMPLETE_TASK.to_string()]);
    }
}

mod users {
    use super::*;

    fn api_with_users() -> FakeApi {
        FakeApi::new().with_users(vec![
            user(50, "Claire Martin", UserRole::Administrateur),
            user(51, "Paul Durand", UserRole::Technicien),
            user(52, "Inès Roy", UserRole::Technicien),
        ])
    }

    fn form(name: &str, email: &str) -> UserForm {
        UserForm {
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_notifies_success_and_refreshes() {
        let h = Harness::new(api_with_users());
        let controller = UsersController::new(h.ctx.clone());
        assert_ok!(controller.load().await);

        let created = assert_ok!(
            controller
                .create(form("  Hugo Petit  ", "hugo.petit@usine.fr"))
                .await
        );

        assert_eq!(created.name, "Hugo Petit", "提交前应去除首尾空白");
        assert_eq!(h.notifier.messages(), vec![notices::USER_CREATED.to_string()]);
        assert_eq!(controller.state().items.len(), 4);
    }

    #[tokio::test]
    async fn test_update_notifies_success() {
        let h = Harness::new(api_with_users());
        let controller = UsersController::new(h.ctx.clone());
        assert_ok!(controller.load().await);

        let existing = controller.state().items[1].clone();
        let mut edit = UserForm::from_user(&existing);
        edit.role = UserRole::Ingenieur;
        assert_ok!(controller.update(existing.id, edit).await);

        assert_eq!(h.notifier.messages(), vec![notices::USER_UPDATED.to_string()]);
        let reloaded = controller
            .state()
            .items
            .into_iter()
            .find(|u| u.id == existing.id)
            .unwrap();
        assert_eq!(reloaded.role, UserRole::Ingenieur);
    }

    #[tokio::test]
    async fn test_backend_detail_shown_on_failure() {
        let h = Harness::new(api_with_users());
        h.api.reject_users_with("Email already registered");
        let controller = UsersController::new(h.ctx.clone());

        assert_err!(controller.create(form("Hugo", "claire@usine.fr")).await);
        assert_eq!(h.notifier.messages(), vec!["Email already registered".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_form_not_submitted() {
        let h = Harness::new(api_with_users());
        let controller = UsersController::new(h.ctx.clone());

        assert_err!(controller.create(form("", "hugo@usine.fr")).await);
        assert_eq!(h.notifier.messages(), vec![MISSING_FIELDS_MESSAGE.to_string()]);
        assert_eq!(h.api.calls("create_user"), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_only_that_user() {
        let h = Harness::new(api_with_users());
        let controller = UsersController::new(h.ctx.clone());
        assert_ok!(controller.load().await);

        let deleted = assert_ok!(controller.delete(fixed_uuid(51)).await);

        assert!(deleted);
        assert_eq!(h.confirmer.asked(), 1);
        let remaining: Vec<_> = controller.state().items.iter().map(|u| u.id).collect();
        assert_eq!(remaining, vec![fixed_uuid(50), fixed_uuid(52)]);
        assert_eq!(h.ctx.activity.entries()[0].message, "Utilisateur \"Paul Durand\" supprimé.");
    }

    #[tokio::test]
    async fn test_declined_confirmation_changes_nothing() {
        let h = Harness::with_confirmer(api_with_users(), FixedConfirmer::declining());
        let controller = UsersController::new(h.ctx.clone());
        assert_ok!(controller.load().await);

        let deleted = assert_ok!(controller.delete(fixed_uuid(51)).await);

        assert!(!deleted);
        assert_eq!(h.api.calls("delete_user"), 0, "取消确认后不应发送请求");
        assert_eq!(h.api.users().len(), 3);
        assert_eq!(controller.state().items.len(), 3);
    }

    #[tokio::test]
    async fn test_role_filter() {
        let h = Harness::new(api_with_users());
        let controller = UsersController::new(h.ctx.clone());
        assert_ok!(controller.load().await);

        controller.set_role_filter(Some(UserRole::Technicien));
        assert_eq!(controller.state().items.len(), 2);

        controller.set_role_filter(None);
        assert_eq!(controller.state().items.len(), 3);
    }
}

mod machines {
    use super::*;
    use machina::models::ThresholdConfig;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_selection_rule() {
        let h = Harness::new(
            FakeApi::new().with_machines(vec![machine(1, "Presse"), machine(2, "Tour")]),
        );
        let controller = MachineListController::new(&h.ctx);
        let changes = controller.selection_changes();

        assert_ok!(controller.load().await);
        assert_eq!(controller.selected_id(), Some(fixed_uuid(1)), "默认选中第一台");
        assert_eq!(changes.borrow().as_ref().map(|m| m.name.clone()), Some("Presse".to_string()));

        assert_ok!(controller.select(fixed_uuid(2)));
        assert_ok!(controller.load().await);
        assert_eq!(controller.selected_id(), Some(fixed_uuid(2)), "刷新后保留仍存在的选中项");

        h.api.set_machines(vec![machine(1, "Presse"), machine(3, "Fraiseuse")]);
        assert_ok!(controller.load().await);
        assert_eq!(controller.selected_id(), Some(fixed_uuid(1)));

        let err = assert_err!(controller.select(fixed_uuid(7)));
        assert!(matches!(err, AppError::NotFound(_)));

        h.api.set_machines(Vec::new());
        assert_ok!(controller.load().await);
        assert_eq!(controller.selected_id(), None);
        assert!(changes.borrow().is_none());
    }

    #[tokio::test]
    async fn test_details_sensor_data_and_active_alerts() {
        let mut presse = machine(1, "Presse");
        presse.thresholds_config = ThresholdConfig::try_from_raw(BTreeMap::from([(
            "temperature_max".to_string(),
            80.0,
        )]))
        .unwrap();
        let mut resolved = alert(61, presse.id, AlertSeverity::Urgence, 30);
        resolved.is_resolved = true;
        let api = FakeApi::new()
            .with_machines(vec![presse.clone()])
            .with_alerts(vec![alert(60, presse.id, AlertSeverity::Critique, 10), resolved])
            .with_sensor_data(
                presse.id,
                vec![
                    reading(presse.id, 20, 70.0),
                    reading(presse.id, 10, 75.0),
                    reading(presse.id, 0, 85.0),
                ],
            );
        let h = Harness::new(api);
        let details = MachineDetailsController::new(h.ctx.clone());

        details.set_machine(Some(presse));
        assert_ok!(details.refresh().await);

        assert_eq!(details.alerts().snapshot().items.len(), 1, "只展示未解决告警");
        assert_eq!(details.health(), MachineHealth::Alert(AlertSeverity::Critique));

        let summary = details.summary().unwrap();
        assert_eq!(summary.points, 3);
        assert_eq!(summary.metrics[0].latest, 85.0);
        assert_eq!(summary.metrics[0].max, 85.0);

        let breaches = details.threshold_breaches();
        assert_eq!(breaches.len(), 1);
        assert_eq!(breaches[0].value, 85.0);
    }

    #[tokio::test]
    async fn test_changing_machine_resets_sources() {
        let presse = machine(1, "Presse");
        let api = FakeApi::new()
            .with_machines(vec![presse.clone()])
            .with_sensor_data(presse.id, vec![reading(presse.id, 0, 70.0)]);
        let h = Harness::new(api);
        let details = MachineDetailsController::new(h.ctx.clone());

        details.set_machine(Some(presse));
        assert_ok!(details.refresh().await);
        assert_eq!(details.sensor_data().snapshot().items.len(), 1);

        details.set_machine(None);
        assert!(!details.sensor_data().snapshot().has_loaded);
        assert_ok!(details.refresh().await);
        assert!(details.sensor_data().snapshot().items.is_empty());
        assert_eq!(details.health(), MachineHealth::Normal);
        assert_eq!(h.api.calls("list_sensor_data"), 1, "未选择机器时不应请求后端");
    }
}

mod models {
    use super::*;
    use machina::models::ModelStatus;

    fn controller(h: &Harness) -> MLModelsController {
        MLModelsController::new(h.ctx.clone(), Arc::new(SimulatedModelProvider::new()))
    }

    #[tokio::test]
    async fn test_retrain_requires_path() {
        let h = Harness::new(FakeApi::new());
        let models = controller(&h);

        assert_err!(models.retrain("model_1", "   ").await);
        assert_eq!(h.notifier.messages(), vec![RETRAIN_PATH_REQUIRED.to_string()]);
    }

    #[tokio::test]
    async fn test_retrain_while_training_notifies() {
        let h = Harness::new(FakeApi::new());
        let models = controller(&h);

        let err = assert_err!(models.retrain("model_3", "/data/rul.csv").await);
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(h.notifier.messages(), vec![mutation_errors::RETRAIN_MODEL.to_string()]);
    }

    #[tokio::test]
    async fn test_retrain_refreshes_list_and_logs() {
        let h = Harness::new(FakeApi::new());
        let models = controller(&h);
        assert_ok!(models.refresh().await);

        assert_ok!(models.retrain("model_1", "/data/temp.csv").await);

        let listed = models.state().items;
        assert_eq!(listed[0].status, ModelStatus::Entrainement);
        let activity = h.ctx.activity.entries();
        assert_eq!(activity[0].kind, LogKind::System);
        assert!(h.notifier.messages().is_empty());
    }
}
