//! 轮询、关联查询、写后刷新与选择等视图同步原语

mod fanout;
mod lifetime;
mod poller;
mod reconcile;
mod selection;
mod view_state;

pub use fanout::{enrich_alerts, resolve_names};
pub use lifetime::ViewLifetime;
pub use poller::{fetcher, Fetcher, PollingSource};
pub use reconcile::{mutate_then_refresh, Confirmer, LogNotifier, Notifier};
pub use selection::Selection;
pub use view_state::{ViewPhase, ViewState};
