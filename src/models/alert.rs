//! 告警模型

use crate::utils::api_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 告警级别（按严重程度升序）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertSeverity {
    Avertissement,
    Critique,
    Urgence,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Avertissement => write!(f, "Avertissement"),
            AlertSeverity::Critique => write!(f, "Critique"),
            AlertSeverity::Urgence => write!(f, "Urgence"),
        }
    }
}

/// 告警事件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: Uuid,
    pub machine_id: Uuid,
    #[serde(with = "api_datetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default, with = "api_datetime::option")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// 附带机器名称的告警（fan-out 结果）
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrichedAlert {
    #[serde(flatten)]
    pub alert: Alert,
    pub machine_name: String,
}

/// 已解决状态过滤
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolvedFilter {
    #[default]
    Unresolved,
    Resolved,
    All,
}

impl ResolvedFilter {
    /// `resolved` 查询参数，`All` 时不传
    pub fn as_query(&self) -> Option<bool> {
        match self {
            ResolvedFilter::Unresolved => Some(false),
            ResolvedFilter::Resolved => Some(true),
            ResolvedFilter::All => None,
        }
    }
}

impl FromStr for ResolvedFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "false" | "unresolved" => Ok(ResolvedFilter::Unresolved),
            "true" | "resolved" => Ok(ResolvedFilter::Resolved),
            "all" => Ok(ResolvedFilter::All),
            other => Err(format!("未知的过滤条件: {} (false|true|all)", other)),
        }
    }
}

/// 全局告警查询参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertQuery {
    pub resolved: ResolvedFilter,
    pub limit: Option<u32>,
}

impl AlertQuery {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_resolved(mut self, resolved: ResolvedFilter) -> Self {
        self.resolved = resolved;
        self
    }

    /// 转为 URL 查询参数
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(resolved) = self.resolved.as_query() {
            params.push(("resolved", resolved.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

/// 机器的总体状态：活跃告警中的最高级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineHealth {
    Normal,
    Alert(AlertSeverity),
}

impl MachineHealth {
    pub fn from_alerts<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Self {
        alerts
            .into_iter()
            .filter(|a| !a.is_resolved)
            .map(|a| a.severity)
            .max()
            .map(MachineHealth::Alert)
            .unwrap_or(MachineHealth::Normal)
    }
}

impl fmt::Display for MachineHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineHealth::Normal => write!(f, "Statut Normal"),
            MachineHealth::Alert(severity) => write!(f, "Alerte: {}", severity),
        }
    }
}
