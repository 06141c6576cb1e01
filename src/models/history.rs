//! 历史事件条目

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{AlertSeverity, EnrichedAlert};

/// 事件类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LogKind {
    Alert,
    DataAnomaly,
    MachineEvent,
    UserAction,
    System,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Alert => "Alert",
            LogKind::DataAnomaly => "DataAnomaly",
            LogKind::MachineEvent => "MachineEvent",
            LogKind::UserAction => "UserAction",
            LogKind::System => "System",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alert" => Ok(LogKind::Alert),
            "dataanomaly" => Ok(LogKind::DataAnomaly),
            "machineevent" => Ok(LogKind::MachineEvent),
            "useraction" => Ok(LogKind::UserAction),
            "system" => Ok(LogKind::System),
            other => Err(format!("未知的事件类型: {}", other)),
        }
    }
}

/// 历史页面的一行
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: LogKind,
    pub machine_id: Option<Uuid>,
    pub machine_name: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub message: String,
}

impl LogEntry {
    /// 不区分大小写，匹配消息、机器名或事件类型
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.message.to_lowercase().contains(&term)
            || self
                .machine_name
                .as_deref()
                .map(|name| name.to_lowercase().contains(&term))
                .unwrap_or(false)
            || self.kind.as_str().to_lowercase().contains(&term)
    }
}

impl From<EnrichedAlert> for LogEntry {
    fn from(enriched: EnrichedAlert) -> Self {
        let alert = enriched.alert;
        Self {
            id: alert.id.to_string(),
            timestamp: alert.timestamp,
            kind: LogKind::Alert,
            machine_id: Some(alert.machine_id),
            machine_name: Some(enriched.machine_name),
            severity: Some(alert.severity),
            message: alert.message,
        }
    }
}
