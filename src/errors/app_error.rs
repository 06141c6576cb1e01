//! 统一错误类型定义

use reqwest::StatusCode;

/// 应用错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // 网络层失败（连接、超时等）
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),

    // 后端返回非 2xx
    #[error("后端返回错误状态 {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    // 响应体无法解析或未通过边界校验
    #[error("响应数据无效: {0}")]
    Decode(String),

    // 资源不存在 (404)
    #[error("资源不存在: {0}")]
    NotFound(String),

    // 表单/参数验证错误
    #[error("请求参数无效: {0}")]
    ValidationError(String),

    // 状态冲突（例如模型已在训练中）
    #[error("资源冲突: {0}")]
    Conflict(String),

    // 视图生命周期已结束，结果被丢弃
    #[error("请求已取消")]
    Cancelled,

    // 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    // 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl AppError {
    /// 根据状态码和响应体构造错误
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = parse_detail(body);
        if status == StatusCode::NOT_FOUND {
            return AppError::NotFound(detail.unwrap_or_else(|| "Not Found".to_string()));
        }
        AppError::Status { status, detail }
    }

    /// 后端提供的错误说明（FastAPI `detail` 字段）
    pub fn detail(&self) -> Option<&str> {
        match self {
            AppError::Status { detail, .. } => detail.as_deref(),
            AppError::NotFound(detail) => Some(detail),
            AppError::ValidationError(msg) | AppError::Conflict(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }
}

/// FastAPI 错误体：`{"detail": "..."}`，detail 也可能是校验错误数组
fn parse_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
