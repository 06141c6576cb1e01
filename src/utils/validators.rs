//! 数据验证工具

use crate::errors::AppError;
use uuid::Uuid;

/// 验证 UUID 格式
pub fn validate_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s.trim()).map_err(|_| AppError::ValidationError("无效的 UUID 格式".to_string()))
}

/// 去除首尾空白，空字符串视为缺失
pub fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
