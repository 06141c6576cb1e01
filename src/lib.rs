//! Machina - 预测性维护监控客户端
//!
//! 工业设备预测性维护后端的无界面客户端，支持：
//! - 机器列表与传感器遥测（定时轮询）
//! - 全局告警、仪表盘与历史事件
//! - 维护任务计划与用户管理
//! - 机器学习模型与 AI 助手对话

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod render;
pub mod services;
pub mod sync;
pub mod utils;

pub use errors::AppError;
