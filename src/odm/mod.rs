//! # ORM管理器模块
//!
//! 管理器核心、按操作分离的处理器和全局管理器槽位

pub mod global;
pub mod handlers;
pub mod manager_core;

pub use global::{global, init_global, is_global_initialized};
pub use handlers::FindResult;
pub use manager_core::OrmManager;
