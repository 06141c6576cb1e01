//! 控制器共享的依赖

use crate::api::MaintenanceApi;
use crate::config::{PollingSettings, Settings};
use crate::sync::{Confirmer, Notifier};
use std::sync::Arc;

use super::ActivityLog;

/// 页面控制器的注入依赖
#[derive(Clone)]
pub struct ViewContext {
    pub api: Arc<dyn MaintenanceApi>,
    pub notifier: Arc<dyn Notifier>,
    pub confirmer: Arc<dyn Confirmer>,
    pub activity: ActivityLog,
    pub polling: PollingSettings,
    pub dedupe_lookups: bool,
}

impl ViewContext {
    pub fn new(
        api: Arc<dyn MaintenanceApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        settings: &Settings,
    ) -> Self {
        Self {
            api,
            notifier,
            confirmer,
            activity: ActivityLog::new(),
            polling: settings.polling.clone(),
            dedupe_lookups: settings.fanout.dedupe_lookups,
        }
    }
}
