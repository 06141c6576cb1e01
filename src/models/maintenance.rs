//! 维护任务模型

use crate::errors::AppError;
use crate::utils::{api_datetime, non_blank};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::{Machine, MISSING_FIELDS_MESSAGE, UNKNOWN_MACHINE};

/// 任务优先级
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    Faible,
    #[default]
    Moyenne,
    #[serde(rename = "Élevée")]
    Elevee,
    Urgent,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::Faible => write!(f, "Faible"),
            TaskPriority::Moyenne => write!(f, "Moyenne"),
            TaskPriority::Elevee => write!(f, "Élevée"),
            TaskPriority::Urgent => write!(f, "Urgent"),
        }
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "faible" | "low" => Ok(TaskPriority::Faible),
            "moyenne" | "medium" => Ok(TaskPriority::Moyenne),
            "élevée" | "elevee" | "high" => Ok(TaskPriority::Elevee),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(format!("未知的优先级: {}", other)),
        }
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[serde(rename = "En attente")]
    Pending,
    #[serde(rename = "En cours")]
    InProgress,
    #[serde(rename = "Terminé")]
    Done,
    #[serde(rename = "Annulé")]
    Cancelled,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "En attente"),
            TaskStatus::InProgress => write!(f, "En cours"),
            TaskStatus::Done => write!(f, "Terminé"),
            TaskStatus::Cancelled => write!(f, "Annulé"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en attente" | "pending" => Ok(TaskStatus::Pending),
            "en cours" | "in-progress" => Ok(TaskStatus::InProgress),
            "terminé" | "termine" | "done" => Ok(TaskStatus::Done),
            "annulé" | "annule" | "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("未知的任务状态: {}", other)),
        }
    }
}

/// 维护任务
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceTask {
    pub id: Uuid,
    pub machine_id: Uuid,
    #[serde(default)]
    pub machine_name: String,
    pub description: String,
    #[serde(with = "api_datetime")]
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// 创建任务请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMaintenanceTask {
    pub machine_id: Uuid,
    pub machine_name: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub assigned_to: String,
    pub status: TaskStatus,
}

/// 计划任务表单
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ScheduleTaskForm {
    #[validate(required(message = "machine_id"))]
    pub machine_id: Option<Uuid>,

    #[validate(length(min = 1, message = "description"))]
    pub description: String,

    #[validate(required(message = "due_date"))]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub priority: TaskPriority,

    #[validate(length(min = 1, message = "assigned_to"))]
    pub assigned_to: String,
}

impl ScheduleTaskForm {
    /// 校验表单并生成请求体
    ///
    /// 新任务状态固定为"En attente"；机器名称从已加载的机器列表中查找，找不到时使用哨兵值。
    pub fn into_new_task(self, machines: &[Machine]) -> Result<NewMaintenanceTask, AppError> {
        let form = Self {
            description: non_blank(&self.description).unwrap_or_default(),
            assigned_to: non_blank(&self.assigned_to).unwrap_or_default(),
            ..self
        };
        if form.validate().is_err() {
            return Err(AppError::ValidationError(MISSING_FIELDS_MESSAGE.to_string()));
        }

        let (Some(machine_id), Some(due_date)) = (form.machine_id, form.due_date) else {
            return Err(AppError::ValidationError(MISSING_FIELDS_MESSAGE.to_string()));
        };

        let machine_name = machines
            .iter()
            .find(|m| m.id == machine_id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| UNKNOWN_MACHINE.to_string());

        Ok(NewMaintenanceTask {
            machine_id,
            machine_name,
            description: form.description,
            due_date,
            priority: form.priority,
            assigned_to: form.assigned_to,
            status: TaskStatus::Pending,
        })
    }
}
