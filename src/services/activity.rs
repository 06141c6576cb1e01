//! 本地操作记录
//!
//! 控制器执行的写操作记录在这里，历史页面把它们与后端告警合并展示。

use crate::models::{LogEntry, LogKind, MachineRef};
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 最多保留的条目数
pub const MAX_ACTIVITY_ENTRIES: usize = 200;

/// 进程内操作日志，克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录用户操作
    pub fn user_action(&self, machine: Option<MachineRef>, message: impl Into<String>) {
        self.record(LogKind::UserAction, machine, message.into());
    }

    /// 记录系统事件
    pub fn system(&self, message: impl Into<String>) {
        self.record(LogKind::System, None, message.into());
    }

    fn record(&self, kind: LogKind, machine: Option<MachineRef>, message: String) {
        let entry = LogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            machine_id: machine.as_ref().map(|m| m.id),
            machine_name: machine.map(|m| m.name),
            severity: None,
            message,
        };
        tracing::debug!(kind = %entry.kind, message = %entry.message, "记录操作");

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(entry);
        entries.truncate(MAX_ACTIVITY_ENTRIES);
    }

    /// 最新的在前
    pub fn entries(&self) -> Vec<LogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
