//! # ORM操作处理器模块
//!
//! 按操作类型分离的处理器实现

pub mod delete_handler;
pub mod read_handler;
pub mod relation_loader;
pub mod save_handler;
pub mod validate_handler;

pub use read_handler::FindResult;
