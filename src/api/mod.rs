//! 后端 REST API 访问层

mod client;

pub use client::HttpApiClient;

use crate::errors::AppError;
use crate::models::{
    Alert, AlertQuery, AssistantReply, AssistantRequest, Machine, MaintenanceTask,
    NewMaintenanceTask, SensorDataPoint, SensorDataQuery, User, UserForm,
};
use async_trait::async_trait;
use uuid::Uuid;

/// 预测性维护后端提供的操作
///
/// 所有页面控制器只依赖这个 trait，测试中以内存实现替换。
#[async_trait]
pub trait MaintenanceApi: Send + Sync {
    /// GET /machines/
    async fn list_machines(&self) -> Result<Vec<Machine>, AppError>;

    /// GET /machines/{id}
    async fn get_machine(&self, id: Uuid) -> Result<Machine, AppError>;

    /// GET /machines/{id}/sensor-data/
    async fn list_sensor_data(
        &self,
        machine_id: Uuid,
        query: &SensorDataQuery,
    ) -> Result<Vec<SensorDataPoint>, AppError>;

    /// GET /machines/{id}/alerts/
    async fn list_machine_alerts(&self, machine_id: Uuid) -> Result<Vec<Alert>, AppError>;

    /// GET /alerts/
    async fn list_alerts(&self, query: &AlertQuery) -> Result<Vec<Alert>, AppError>;

    /// PUT /alerts/{id}/resolve
    async fn resolve_alert(&self, id: Uuid) -> Result<(), AppError>;

    /// GET /maintenance-tasks/
    async fn list_tasks(&self) -> Result<Vec<MaintenanceTask>, AppError>;

    /// POST /maintenance-tasks/
    async fn create_task(&self, task: &NewMaintenanceTask) -> Result<MaintenanceTask, AppError>;

    /// PUT /maintenance-tasks/{id}/complete
    async fn complete_task(&self, id: Uuid) -> Result<(), AppError>;

    /// GET /users/
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// POST /users/
    async fn create_user(&self, form: &UserForm) -> Result<User, AppError>;

    /// PUT /users/{id}
    async fn update_user(&self, id: Uuid, form: &UserForm) -> Result<User, AppError>;

    /// DELETE /users/{id}
    async fn delete_user(&self, id: Uuid) -> Result<(), AppError>;

    /// POST /ai-assistant/
    async fn ask_assistant(&self, request: &AssistantRequest) -> Result<AssistantReply, AppError>;
}
