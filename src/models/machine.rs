//! 机器与阈值配置模型

use crate::utils::api_datetime;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::SensorDataPoint;

/// 机器实体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub model_number: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default, with = "api_datetime::option")]
    pub installation_date: Option<DateTime<Utc>>,
    #[serde(default, with = "api_datetime::option")]
    pub last_maintenance_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thresholds_config: ThresholdConfig,
    #[serde(default, with = "api_datetime::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "api_datetime::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Machine {
    pub fn to_ref(&self) -> MachineRef {
        MachineRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// 机器的最小引用（选中状态、助手上下文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineRef {
    pub id: Uuid,
    pub name: String,
}

/// 传感器指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensorMetric {
    Temperature,
    Vibration,
    Pressure,
    Current,
}

impl SensorMetric {
    pub const ALL: [SensorMetric; 4] = [
        SensorMetric::Temperature,
        SensorMetric::Vibration,
        SensorMetric::Pressure,
        SensorMetric::Current,
    ];

    /// JSON 字段名
    pub fn key(&self) -> &'static str {
        match self {
            SensorMetric::Temperature => "temperature",
            SensorMetric::Vibration => "vibration",
            SensorMetric::Pressure => "pressure",
            SensorMetric::Current => "current",
        }
    }

    /// 展示标签
    pub fn label(&self) -> &'static str {
        match self {
            SensorMetric::Temperature => "Température (°C)",
            SensorMetric::Vibration => "Vibration",
            SensorMetric::Pressure => "Pression",
            SensorMetric::Current => "Courant",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }
}

/// 阈值方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    fn key(&self) -> &'static str {
        match self {
            Bound::Min => "min",
            Bound::Max => "max",
        }
    }
}

/// 阈值键，例如 `temperature_max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThresholdKey {
    pub metric: SensorMetric,
    pub bound: Bound,
}

lazy_static! {
    static ref THRESHOLD_KEY_REGEX: Regex =
        Regex::new(r"^(temperature|vibration|pressure|current)_(min|max)$").unwrap();
}

impl ThresholdKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = THRESHOLD_KEY_REGEX.captures(raw)?;
        let metric = SensorMetric::from_key(caps.get(1)?.as_str())?;
        let bound = match caps.get(2)?.as_str() {
            "min" => Bound::Min,
            _ => Bound::Max,
        };
        Some(Self { metric, bound })
    }
}

impl fmt::Display for ThresholdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.metric.key(), self.bound.key())
    }
}

/// 机器阈值配置
///
/// 后端以 JSON 对象存储（`{"temperature_max": 90.0, ...}`），解码时校验键名与取值，
/// 不合法的配置整体拒绝。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdConfig {
    values: BTreeMap<ThresholdKey, f64>,
}

/// 某个读数越过阈值
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBreach {
    pub key: ThresholdKey,
    pub limit: f64,
    pub value: f64,
}

impl ThresholdConfig {
    /// 从原始键值构造并校验
    pub fn try_from_raw(raw: BTreeMap<String, f64>) -> Result<Self, String> {
        let mut values = BTreeMap::new();
        for (key, value) in raw {
            let parsed = ThresholdKey::parse(&key).ok_or_else(|| format!("未知的阈值键: {}", key))?;
            if !value.is_finite() {
                return Err(format!("阈值 {} 必须是有限数值", key));
            }
            values.insert(parsed, value);
        }

        for metric in SensorMetric::ALL {
            let min = values.get(&ThresholdKey { metric, bound: Bound::Min });
            let max = values.get(&ThresholdKey { metric, bound: Bound::Max });
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(format!(
                        "{} 的下限 {} 大于上限 {}",
                        metric.key(),
                        min,
                        max
                    ));
                }
            }
        }

        Ok(Self { values })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, metric: SensorMetric, bound: Bound) -> Option<f64> {
        self.values.get(&ThresholdKey { metric, bound }).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ThresholdKey, &f64)> {
        self.values.iter()
    }

    /// 检查读数越限情况
    pub fn breaches(&self, point: &SensorDataPoint) -> Vec<ThresholdBreach> {
        self.values
            .iter()
            .filter_map(|(key, limit)| {
                let value = point.value(key.metric);
                let violated = match key.bound {
                    Bound::Min => value < *limit,
                    Bound::Max => value > *limit,
                };
                violated.then(|| ThresholdBreach {
                    key: *key,
                    limit: *limit,
                    value,
                })
            })
            .collect()
    }
}

impl Serialize for ThresholdConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw: BTreeMap<String, f64> = self
            .values
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ThresholdConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // null 视为未配置
        let raw = Option::<BTreeMap<String, f64>>::deserialize(deserializer)?.unwrap_or_default();
        ThresholdConfig::try_from_raw(raw).map_err(serde::de::Error::custom)
    }
}
