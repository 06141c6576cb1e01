//! 配置管理模块

mod settings;

pub use settings::{
	Settings,
	ApiSettings,
	PollingSettings,
	FanOutSettings,
	DisplaySettings,
	LoggingSettings,
	DEFAULT_API_BASE_URL,
	MIN_POLL_SECONDS,
	MAX_POLL_SECONDS,
};
