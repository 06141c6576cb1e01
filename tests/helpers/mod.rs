//! 测试辅助工具

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use machina::config::Settings;
use machina::models::{
    Alert, AlertSeverity, Machine, MaintenanceTask, SensorDataPoint, TaskPriority, TaskStatus,
    ThresholdConfig, User, UserRole, UserStatus,
};
use machina::services::ViewContext;
use machina::sync::{Confirmer, Notifier};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::mocks::FakeApi;

/// 生成固定的测试 UUID（用于可重复测试）
pub fn fixed_uuid(seed: u8) -> Uuid {
    Uuid::from_bytes([seed, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, seed])
}

/// 固定的基准时间
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

pub fn machine(seed: u8, name: &str) -> Machine {
    Machine {
        id: fixed_uuid(seed),
        name: name.to_string(),
        location: Some("Atelier A".to_string()),
        machine_type: Some("Presse".to_string()),
        model_number: None,
        serial_number: Some(format!("SN-{}", seed)),
        installation_date: None,
        last_maintenance_date: None,
        thresholds_config: ThresholdConfig::default(),
        created_at: None,
        updated_at: None,
    }
}

/// `minutes` 分钟前（相对基准时间）产生的告警
pub fn alert(seed: u8, machine_id: Uuid, severity: AlertSeverity, minutes: i64) -> Alert {
    Alert {
        id: fixed_uuid(seed),
        machine_id,
        timestamp: base_time() - Duration::minutes(minutes),
        alert_type: "Température".to_string(),
        severity,
        message: format!("Alerte {}", seed),
        is_resolved: false,
        resolved_at: None,
    }
}

pub fn task(seed: u8, machine: &Machine, status: TaskStatus, due: (i32, u32, u32)) -> MaintenanceTask {
    let date = NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap();
    MaintenanceTask {
        id: fixed_uuid(seed),
        machine_id: machine.id,
        machine_name: machine.name.clone(),
        description: format!("Tâche {}", seed),
        due_date: Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()),
        priority: TaskPriority::Moyenne,
        status,
        assigned_to: Some("Jean Dupont".to_string()),
    }
}

pub fn user(seed: u8, name: &str, role: UserRole) -> User {
    User {
        id: fixed_uuid(seed),
        name: name.to_string(),
        email: format!("user{}@usine.fr", seed),
        role,
        status: UserStatus::Actif,
        created_at: None,
        updated_at: None,
    }
}

pub fn reading(machine_id: Uuid, minutes: i64, temperature: f64) -> SensorDataPoint {
    SensorDataPoint {
        machine_id: Some(machine_id),
        timestamp: base_time() - Duration::minutes(minutes),
        temperature,
        vibration: 0.4,
        pressure: 2.1,
        current: 11.0,
        operating_hours: None,
        labels: Vec::new(),
    }
}

/// 记录所有提示文案
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// 固定回答的确认器，并统计被询问次数
#[derive(Debug)]
pub struct FixedConfirmer {
    answer: bool,
    asked: AtomicUsize,
}

impl FixedConfirmer {
    pub fn accepting() -> Self {
        Self {
            answer: true,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn declining() -> Self {
        Self {
            answer: false,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl Confirmer for FixedConfirmer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// 一组测试依赖
pub struct Harness {
    pub api: Arc<FakeApi>,
    pub notifier: Arc<RecordingNotifier>,
    pub confirmer: Arc<FixedConfirmer>,
    pub ctx: ViewContext,
}

impl Harness {
    pub fn new(api: FakeApi) -> Self {
        Self::with_confirmer(api, FixedConfirmer::accepting())
    }

    pub fn with_confirmer(api: FakeApi, confirmer: FixedConfirmer) -> Self {
        let api = Arc::new(api);
        let notifier = Arc::new(RecordingNotifier::default());
        let confirmer = Arc::new(confirmer);
        let ctx = ViewContext::new(
            api.clone(),
            notifier.clone(),
            confirmer.clone(),
            &Settings::default(),
        );
        Self {
            api,
            notifier,
            confirmer,
            ctx,
        }
    }
}

/// 断言结果是成功的
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// 断言结果是错误的
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?}", val),
            Err(e) => e,
        }
    };
}
