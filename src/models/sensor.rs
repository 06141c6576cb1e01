//! 传感器数据模型

use crate::utils::{api_datetime, format_iso8601, hours_ago};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SensorMetric;

/// 详情页默认拉取的时间窗口（小时）
pub const SENSOR_WINDOW_HOURS: i64 = 24;
/// 详情页默认拉取的最大点数
pub const SENSOR_DEFAULT_LIMIT: u32 = 500;

/// 传感器数据点
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorDataPoint {
    #[serde(default)]
    pub machine_id: Option<Uuid>,
    #[serde(with = "api_datetime")]
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub current: f64,
    #[serde(default)]
    pub operating_hours: Option<f64>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl SensorDataPoint {
    /// 读取指定指标的值
    pub fn value(&self, metric: SensorMetric) -> f64 {
        match metric {
            SensorMetric::Temperature => self.temperature,
            SensorMetric::Vibration => self.vibration,
            SensorMetric::Pressure => self.pressure,
            SensorMetric::Current => self.current,
        }
    }
}

/// 传感器数据查询参数
#[derive(Debug, Clone, Serialize)]
pub struct SensorDataQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SensorDataQuery {
    /// 最近 24 小时，最多 500 个点
    pub fn trailing_window() -> Self {
        Self {
            start_time: Some(format_iso8601(&hours_ago(SENSOR_WINDOW_HOURS))),
            end_time: None,
            limit: Some(SENSOR_DEFAULT_LIMIT),
        }
    }
}

/// 单个指标的统计
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub metric: SensorMetric,
    pub latest: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// 时间序列统计（交给图表组件前的摘要）
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSummary {
    pub points: usize,
    pub first_at: DateTime<Utc>,
    pub last_at: DateTime<Utc>,
    pub metrics: Vec<MetricSummary>,
}

impl SensorSummary {
    /// 空序列返回 None
    pub fn from_points(points: &[SensorDataPoint]) -> Option<Self> {
        let latest = points.iter().max_by_key(|p| p.timestamp)?;
        let first = points.iter().min_by_key(|p| p.timestamp)?;

        let metrics = SensorMetric::ALL
            .into_iter()
            .map(|metric| {
                let values = points.iter().map(|p| p.value(metric));
                let (min, max, sum) = values.fold(
                    (f64::INFINITY, f64::NEG_INFINITY, 0.0),
                    |(min, max, sum), v| (min.min(v), max.max(v), sum + v),
                );
                MetricSummary {
                    metric,
                    latest: latest.value(metric),
                    min,
                    max,
                    mean: sum / points.len() as f64,
                }
            })
            .collect();

        Some(Self {
            points: points.len(),
            first_at: first.timestamp,
            last_at: latest.timestamp,
            metrics,
        })
    }
}

/// 按指标抽取时间序列（供外部图表绘制）
pub fn series(points: &[SensorDataPoint], metric: SensorMetric) -> Vec<(DateTime<Utc>, f64)> {
    points.iter().map(|p| (p.timestamp, p.value(metric))).collect()
}
