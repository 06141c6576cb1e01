//! 应用配置加载和管理

use crate::errors::AppError;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// 未配置时使用的后端地址
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// 轮询间隔允许范围（秒）
pub const MIN_POLL_SECONDS: u64 = 10;
pub const MAX_POLL_SECONDS: u64 = 60;

/// 应用配置结构
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub polling: PollingSettings,
    #[serde(default)]
    pub fanout: FanOutSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    pub logging: LoggingSettings,
}

/// 后端 API 配置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// 各页面的轮询间隔（秒）
#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    pub alerts_seconds: u64,
    pub sensor_data_seconds: u64,
    pub machine_alerts_seconds: u64,
    pub dashboard_seconds: u64,
    pub history_seconds: u64,
    pub ml_models_seconds: u64,
}

/// 关联查询（fan-out）配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FanOutSettings {
    /// 同一轮询周期内相同外键只查询一次
    #[serde(default)]
    pub dedupe_lookups: bool,
}

/// 展示配置
#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySettings {
    /// IANA 时区名，用于格式化时间戳
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String { "Europe/Paris".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_seconds: 10,
            },
            polling: PollingSettings::default(),
            fanout: FanOutSettings::default(),
            display: DisplaySettings::default(),
            logging: LoggingSettings {
                level: "info,machina=debug".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            alerts_seconds: 15,
            sensor_data_seconds: 10,
            machine_alerts_seconds: 10,
            dashboard_seconds: 15,
            history_seconds: 60,
            ml_models_seconds: 30,
        }
    }
}

impl PollingSettings {
    pub fn alerts(&self) -> Duration { Duration::from_secs(self.alerts_seconds) }
    pub fn sensor_data(&self) -> Duration { Duration::from_secs(self.sensor_data_seconds) }
    pub fn machine_alerts(&self) -> Duration { Duration::from_secs(self.machine_alerts_seconds) }
    pub fn dashboard(&self) -> Duration { Duration::from_secs(self.dashboard_seconds) }
    pub fn history(&self) -> Duration { Duration::from_secs(self.history_seconds) }
    pub fn ml_models(&self) -> Duration { Duration::from_secs(self.ml_models_seconds) }

    fn validate(&self) -> Result<(), AppError> {
        let intervals = [
            ("alerts_seconds", self.alerts_seconds),
            ("sensor_data_seconds", self.sensor_data_seconds),
            ("machine_alerts_seconds", self.machine_alerts_seconds),
            ("dashboard_seconds", self.dashboard_seconds),
            ("history_seconds", self.history_seconds),
            ("ml_models_seconds", self.ml_models_seconds),
        ];
        for (name, value) in intervals {
            if !(MIN_POLL_SECONDS..=MAX_POLL_SECONDS).contains(&value) {
                return Err(AppError::ConfigError(format!(
                    "polling.{} 必须在 {}-{} 秒之间，当前为 {}",
                    name, MIN_POLL_SECONDS, MAX_POLL_SECONDS, value
                )));
            }
        }
        Ok(())
    }
}

impl Settings {
    /// 从配置文件和环境变量加载配置
    pub fn load() -> Result<Self, AppError> {
        let run_mode = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let defaults = Settings::default();

        // 兼容旧的 API_BASE_URL 环境变量（优先级低于配置文件和 MACHINA_ 前缀变量）
        let base_url = env::var("API_BASE_URL").unwrap_or_else(|_| defaults.api.base_url.clone());

        let settings = Config::builder()
            .set_default("api.base_url", base_url)?
            .set_default("api.timeout_seconds", defaults.api.timeout_seconds)?
            .set_default("polling.alerts_seconds", defaults.polling.alerts_seconds)?
            .set_default("polling.sensor_data_seconds", defaults.polling.sensor_data_seconds)?
            .set_default("polling.machine_alerts_seconds", defaults.polling.machine_alerts_seconds)?
            .set_default("polling.dashboard_seconds", defaults.polling.dashboard_seconds)?
            .set_default("polling.history_seconds", defaults.polling.history_seconds)?
            .set_default("polling.ml_models_seconds", defaults.polling.ml_models_seconds)?
            .set_default("logging.level", defaults.logging.level.clone())?
            .set_default("logging.format", defaults.logging.format.clone())?
            // 可选配置文件
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // 环境变量覆盖，前缀 MACHINA，分隔符 __
            .add_source(
                Environment::with_prefix("MACHINA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<(), AppError> {
        reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            AppError::ConfigError(format!("api.base_url 无效 ({}): {}", self.api.base_url, e))
        })?;
        if self.api.timeout_seconds == 0 {
            return Err(AppError::ConfigError("api.timeout_seconds 必须大于 0".to_string()));
        }
        self.polling.validate()?;
        self.timezone()?;
        Ok(())
    }

    /// 后端请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    /// 展示时区
    pub fn timezone(&self) -> Result<Tz, AppError> {
        self.display
            .timezone
            .parse::<Tz>()
            .map_err(|e| AppError::ConfigError(format!("display.timezone 无效: {}", e)))
    }
}
