//! 用户数据模型

use crate::utils::api_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// 用户角色枚举
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UserRole {
    Administrateur,
    #[serde(rename = "Ingénieur")]
    Ingenieur,
    #[default]
    Technicien,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Administrateur => write!(f, "Administrateur"),
            UserRole::Ingenieur => write!(f, "Ingénieur"),
            UserRole::Technicien => write!(f, "Technicien"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "administrateur" | "admin" => Ok(UserRole::Administrateur),
            "ingénieur" | "ingenieur" | "engineer" => Ok(UserRole::Ingenieur),
            "technicien" | "technician" => Ok(UserRole::Technicien),
            other => Err(format!("未知的用户角色: {}", other)),
        }
    }
}

/// 用户状态
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStatus {
    #[default]
    Actif,
    Inactif,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Actif => write!(f, "Actif"),
            UserStatus::Inactif => write!(f, "Inactif"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "actif" | "active" => Ok(UserStatus::Actif),
            "inactif" | "inactive" => Ok(UserStatus::Inactif),
            other => Err(format!("未知的用户状态: {}", other)),
        }
    }
}

/// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(default, with = "api_datetime::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "api_datetime::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 新增/编辑用户表单
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct UserForm {
    #[validate(length(min = 1, max = 100, message = "Le nom est obligatoire."))]
    pub name: String,

    #[validate(email(message = "Adresse e-mail invalide."))]
    pub email: String,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default)]
    pub status: UserStatus,
}

impl UserForm {
    /// 以已有用户预填表单（编辑模式）
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
        }
    }

    /// 去除首尾空白
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }
}
