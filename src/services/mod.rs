//! 页面控制器（每个页面一个）

mod activity;
mod alerts;
mod assistant;
mod context;
mod dashboard;
mod history;
mod machines;
mod maintenance;
mod ml_models;
mod users;

pub use activity::{ActivityLog, MAX_ACTIVITY_ENTRIES};
pub use alerts::AlertsController;
pub use assistant::{greeting, AssistantSession};
pub use context::ViewContext;
pub use dashboard::{AlertOverview, DashboardController, DASHBOARD_ALERT_LIMIT};
pub use history::{HistoryController, HistoryFilter, HISTORY_ALERT_LIMIT};
pub use machines::{MachineDetailsController, MachineListController};
pub use maintenance::MaintenanceController;
pub use ml_models::{MLModelsController, ModelProvider, SimulatedModelProvider};
pub use users::{user_form_error, UsersController};
