//! 机器学习模型

use crate::utils::api_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

/// 模型状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelStatus {
    Actif,
    Inactif,
    #[serde(rename = "Entraînement")]
    Entrainement,
    Erreur,
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::Actif => write!(f, "Actif"),
            ModelStatus::Inactif => write!(f, "Inactif"),
            ModelStatus::Entrainement => write!(f, "Entraînement"),
            ModelStatus::Erreur => write!(f, "Erreur"),
        }
    }
}

/// 超参数取值：仅接受标量
///
/// null、数组与对象在反序列化时被拒绝。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HyperparameterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for HyperparameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HyperparameterValue::Bool(v) => write!(f, "{}", v),
            HyperparameterValue::Integer(v) => write!(f, "{}", v),
            HyperparameterValue::Float(v) => write!(f, "{}", v),
            HyperparameterValue::Text(v) => write!(f, "{}", v),
        }
    }
}

pub type Hyperparameters = BTreeMap<String, HyperparameterValue>;

/// 模型描述
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MLModel {
    pub id: String,
    pub name: String,
    pub algorithm: String,
    pub version: String,
    pub status: ModelStatus,
    #[serde(with = "api_datetime")]
    pub last_trained: DateTime<Utc>,
    #[serde(default)]
    pub performance_score: Option<f64>,
    #[serde(default)]
    pub deployed_machines_count: Option<u32>,
    #[serde(default)]
    pub training_logs: Vec<String>,
    #[serde(default)]
    pub evaluation_metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub hyperparameters: Hyperparameters,
    #[serde(default)]
    pub feature_importance: BTreeMap<String, f64>,
}

impl MLModel {
    pub fn is_training(&self) -> bool {
        self.status == ModelStatus::Entrainement
    }

    /// 按重要性降序排列的特征
    pub fn ranked_features(&self) -> Vec<(&str, f64)> {
        let mut features: Vec<(&str, f64)> = self
            .feature_importance
            .iter()
            .map(|(name, weight)| (name.as_str(), *weight))
            .collect();
        features.sort_by(|a, b| b.1.total_cmp(&a.1));
        features
    }
}

/// 重新训练请求
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RetrainRequest {
    #[validate(length(min = 1, message = "Veuillez indiquer le chemin des données d'entraînement."))]
    pub training_data_path: String,
}

impl RetrainRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            training_data_path: path.into().trim().to_string(),
        }
    }
}
