//! 视图状态与渲染阶段

use chrono::{DateTime, Utc};

/// 一个数据源发布的状态
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    /// 最近一次成功拉取的完整结果
    pub items: Vec<T>,
    pub loading: bool,
    /// 本地化的静态错误提示
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    /// 是否已有过一次结果（成功或失败）
    pub has_loaded: bool,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            last_updated: None,
            has_loaded: false,
        }
    }
}

/// 渲染阶段，完全由状态推导
#[derive(Debug, PartialEq)]
pub enum ViewPhase<'a, T> {
    Loading,
    /// 失败时仍携带上一次成功的数据
    Error { message: &'a str, stale: &'a [T] },
    Empty,
    Populated(&'a [T]),
}

impl<T> ViewState<T> {
    pub fn phase(&self) -> ViewPhase<'_, T> {
        if let Some(message) = self.error.as_deref() {
            return ViewPhase::Error {
                message,
                stale: &self.items,
            };
        }
        if !self.has_loaded {
            return ViewPhase::Loading;
        }
        if self.items.is_empty() {
            ViewPhase::Empty
        } else {
            ViewPhase::Populated(&self.items)
        }
    }

    /// 对集合做只读投影（过滤、排序在读取时完成）
    pub fn project<U>(&self, f: impl FnOnce(&[T]) -> Vec<U>) -> ViewState<U> {
        ViewState {
            items: f(&self.items),
            loading: self.loading,
            error: self.error.clone(),
            last_updated: self.last_updated,
            has_loaded: self.has_loaded,
        }
    }
}
