//! 数据模型模块

mod alert;
mod chat;
mod common;
mod history;
mod machine;
mod maintenance;
mod ml_model;
mod sensor;
mod user;

pub use alert::*;
pub use chat::*;
pub use common::*;
pub use history::*;
pub use machine::*;
pub use maintenance::*;
pub use ml_model::*;
pub use sensor::*;
pub use user::*;
