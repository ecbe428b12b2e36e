//! rat_quickorm - 基于记录与关系的异步ORM引擎
//!
//! 把表中的行映射为记录，提供增删改查、声明式的关系遍历、
//! 字段验证和级联保存，调用方无需为每个实体手写语句。
//! 语句为 MySQL 风格，由可替换的执行器执行；自带的内存执行器
//! 可在没有数据库服务时运行完整流程。

// 导出所有公共模块
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod i18n;
pub mod inflector;
pub mod model;
pub mod odm;
pub mod query;
pub mod security;
pub mod table;
pub mod types;
pub mod validation;

// 重新导出常用类型和函数
pub use config::{
    ConnectionOptions, ConnectionOptionsBuilder, DriverKind, LogLevel, LoggingConfig, LoggingConfigBuilder,
    OrmConfig, OrmConfigBuilder, init_logging, memory_config, mysql_config,
};
pub use database::{Database, QueryLogEntry};
pub use error::{QuickOrmError, QuickOrmResult};
pub use executor::{ColumnSpec, MemoryExecutor, QueryOutput, ResultSet, RowMap, SqlExecutor};
#[cfg(feature = "mysql-support")]
pub use executor::MysqlExecutor;
pub use model::{
    ModelDefinition, ModelDump, ModelInfo, Record, RelationDeclaration, RelationDescriptor, RelationKind,
    RelationValue,
};
pub use odm::{FindResult, OrmManager, global, init_global};
pub use query::ConditionCompiler;
pub use table::{ColumnDefinition, SchemaCache, TableSchema};
pub use types::*;
pub use validation::{RuleDeclaration, ValidationErrors, ValidationIgnore, ValidationOutcome};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_quickorm库
///
/// 注册多语言错误消息并按环境变量选择语言
///
/// 注意：日志系统由调用者自行初始化，本库不会自动初始化日志
pub fn init() {
    i18n::ErrorMessageI18n::init();
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_repeatable() {
        init();
        init();
        assert!(!i18n::t("error.query").is_empty());
        assert!(get_info().starts_with(NAME));
    }
}
