//! 逐条关联查询（fan-out）
//!
//! 主列表中的每条记录发起一次二级查询，全部并发执行；单条失败只影响该条，
//! 用哨兵值代替。开启去重后，同一轮中相同外键只查询一次，不跨轮缓存。

use crate::api::MaintenanceApi;
use crate::errors::AppError;
use crate::models::{Alert, EnrichedAlert};
use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use uuid::Uuid;

/// 为每条记录解析一个名称
pub async fn resolve_names<R, K, L, Fut>(
    records: Vec<R>,
    key_of: K,
    lookup: L,
    sentinel: &str,
    dedupe: bool,
) -> Vec<(R, String)>
where
    K: Fn(&R) -> Option<Uuid>,
    L: Fn(Uuid) -> Fut,
    Fut: Future<Output = Result<String, AppError>>,
{
    let lookup = &lookup;
    let resolve = |id: Uuid| async move {
        match lookup(id).await {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "关联查询失败，使用占位值");
                None
            }
        }
    };

    if dedupe {
        let mut keys: Vec<Uuid> = records.iter().filter_map(&key_of).collect();
        keys.sort();
        keys.dedup();
        let names = join_all(keys.iter().map(|id| resolve(*id))).await;
        let cache: HashMap<Uuid, String> = keys
            .into_iter()
            .zip(names)
            .filter_map(|(id, name)| name.map(|n| (id, n)))
            .collect();

        return records
            .into_iter()
            .map(|record| {
                let name = key_of(&record)
                    .and_then(|id| cache.get(&id).cloned())
                    .unwrap_or_else(|| sentinel.to_string());
                (record, name)
            })
            .collect();
    }

    let resolve = &resolve;
    let names = join_all(records.iter().map(|record| {
        let key = key_of(record);
        async move {
            match key {
                Some(id) => resolve(id).await,
                None => None,
            }
        }
    }))
    .await;

    records
        .into_iter()
        .zip(names)
        .map(|(record, name)| (record, name.unwrap_or_else(|| sentinel.to_string())))
        .collect()
}

/// 为告警补充机器名称
pub async fn enrich_alerts(
    api: &dyn MaintenanceApi,
    alerts: Vec<Alert>,
    sentinel: &str,
    dedupe: bool,
) -> Vec<EnrichedAlert> {
    let resolved = resolve_names(
        alerts,
        |alert| Some(alert.machine_id),
        |id| async move { api.get_machine(id).await.map(|m| m.name) },
        sentinel,
        dedupe,
    )
    .await;

    resolved
        .into_iter()
        .map(|(alert, machine_name)| EnrichedAlert { alert, machine_name })
        .collect()
}
