//! 主从选择

/// 当前选中项
///
/// 每次列表刷新后调用 `reconcile`：原选中项仍存在则保留，否则选第一项，列表为空则清空。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<K> {
    current: Option<K>,
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<K: Copy + PartialEq> Selection<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// 设置选中项，返回是否发生变化
    pub fn select(&mut self, next: Option<K>) -> bool {
        if self.current == next {
            return false;
        }
        self.current = next;
        true
    }

    /// 根据最新列表调整选中项，返回是否发生变化
    pub fn reconcile<T>(&mut self, items: &[T], id_of: impl Fn(&T) -> K) -> bool {
        let still_present = self
            .current
            .filter(|id| items.iter().any(|item| id_of(item) == *id));
        let next = still_present.or_else(|| items.first().map(&id_of));
        self.select(next)
    }
}
