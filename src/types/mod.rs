//! 通用数据类型定义
//!
//! 定义记录字段值、查询选项和保存选项

pub mod data_value;
pub mod query;

// 重新导出所有公共类型
pub use data_value::{ColumnKind, DataValue};
pub use query::{
    Condition, FieldSelection, FindOptions, FindType, Limit, LogicalOperator, QueryOperator,
    SaveOptions,
};
