//! 基于 reqwest 的 API 客户端

use crate::config::ApiSettings;
use crate::errors::AppError;
use crate::models::{
    Alert, AlertQuery, AssistantReply, AssistantRequest, Machine, MaintenanceTask,
    NewMaintenanceTask, SensorDataPoint, SensorDataQuery, User, UserForm,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

use super::MaintenanceApi;

/// HTTP 客户端，基础地址由配置注入
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    /// 根据配置创建客户端
    pub fn new(settings: &ApiSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self::with_client(client, &settings.base_url))
    }

    /// 使用已有的 reqwest 客户端
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 发送请求，非 2xx 转为 `AppError`
    async fn execute(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "后端请求失败");
            AppError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %body, "后端返回错误状态");
        Err(AppError::from_status(status, &body))
    }

    /// 发送请求并解析 JSON 响应体
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "响应数据解析失败");
            AppError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl MaintenanceApi for HttpApiClient {
    async fn list_machines(&self) -> Result<Vec<Machine>, AppError> {
        tracing::debug!("GET /machines/");
        self.fetch(self.client.get(self.url("/machines/"))).await
    }

    async fn get_machine(&self, id: Uuid) -> Result<Machine, AppError> {
        tracing::debug!(machine_id = %id, "GET /machines/{{id}}");
        self.fetch(self.client.get(self.url(&format!("/machines/{}", id))))
            .await
    }

    async fn list_sensor_data(
        &self,
        machine_id: Uuid,
        query: &SensorDataQuery,
    ) -> Result<Vec<SensorDataPoint>, AppError> {
        tracing::debug!(machine_id = %machine_id, limit = ?query.limit, "GET sensor-data");
        let request = self
            .client
            .get(self.url(&format!("/machines/{}/sensor-data/", machine_id)))
            .query(query);
        self.fetch(request).await
    }

    async fn list_machine_alerts(&self, machine_id: Uuid) -> Result<Vec<Alert>, AppError> {
        tracing::debug!(machine_id = %machine_id, "GET machine alerts");
        self.fetch(
            self.client
                .get(self.url(&format!("/machines/{}/alerts/", machine_id))),
        )
        .await
    }

    async fn list_alerts(&self, query: &AlertQuery) -> Result<Vec<Alert>, AppError> {
        let params = query.to_params();
        tracing::debug!(params = ?params, "GET /alerts/");
        self.fetch(self.client.get(self.url("/alerts/")).query(&params))
            .await
    }

    async fn resolve_alert(&self, id: Uuid) -> Result<(), AppError> {
        tracing::debug!(alert_id = %id, "PUT resolve alert");
        self.execute(self.client.put(self.url(&format!("/alerts/{}/resolve", id))))
            .await?;
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<MaintenanceTask>, AppError> {
        tracing::debug!("GET /maintenance-tasks/");
        self.fetch(self.client.get(self.url("/maintenance-tasks/")))
            .await
    }

    async fn create_task(&self, task: &NewMaintenanceTask) -> Result<MaintenanceTask, AppError> {
        tracing::debug!(machine_id = %task.machine_id, "POST /maintenance-tasks/");
        self.fetch(self.client.post(self.url("/maintenance-tasks/")).json(task))
            .await
    }

    async fn complete_task(&self, id: Uuid) -> Result<(), AppError> {
        tracing::debug!(task_id = %id, "PUT complete task");
        self.execute(
            self.client
                .put(self.url(&format!("/maintenance-tasks/{}/complete", id))),
        )
        .await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        tracing::debug!("GET /users/");
        self.fetch(self.client.get(self.url("/users/"))).await
    }

    async fn create_user(&self, form: &UserForm) -> Result<User, AppError> {
        tracing::debug!("POST /users/");
        self.fetch(self.client.post(self.url("/users/")).json(form))
            .await
    }

    async fn update_user(&self, id: Uuid, form: &UserForm) -> Result<User, AppError> {
        tracing::debug!(user_id = %id, "PUT /users/{{id}}");
        self.fetch(
            self.client
                .put(self.url(&format!("/users/{}", id)))
                .json(form),
        )
        .await
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        tracing::debug!(user_id = %id, "DELETE /users/{{id}}");
        self.execute(self.client.delete(self.url(&format!("/users/{}", id))))
            .await?;
        Ok(())
    }

    async fn ask_assistant(&self, request: &AssistantRequest) -> Result<AssistantReply, AppError> {
        tracing::debug!(machine_id = ?request.machine_id, "POST /ai-assistant/");
        self.fetch(self.client.post(self.url("/ai-assistant/")).json(request))
            .await
    }
}
