//! 表结构模块
//!
//! 通过 `describe` 读取表结构并按 (表名, 模型) 缓存，同时维护表的行数

pub mod cache;
pub mod schema;

pub use cache::SchemaCache;
pub use schema::{ColumnDefinition, TableSchema};
