//! # 便捷配置函数
//!
//! 常见组合的快捷构建，内部仍走构建器的严格验证

use crate::config::core::{ConnectionOptions, DriverKind, LogLevel, LoggingConfig, OrmConfig};
use crate::error::QuickOrmError;

/// 内存执行器配置
///
/// 日志级别为 Info 且不输出到控制台，查询日志保留 256 条
///
/// # 参数
///
/// * `debug_mutations` - 是否只记录而不执行写操作
pub fn memory_config(debug_mutations: bool) -> Result<OrmConfig, QuickOrmError> {
    OrmConfig::builder()
        .connection(ConnectionOptions::builder().driver(DriverKind::Memory).build()?)
        .logging(LoggingConfig::builder().level(LogLevel::Info).console(false).build()?)
        .debug_mutations(debug_mutations)
        .query_log_capacity(256)
        .build()
}

/// MySQL 配置
///
/// # 参数
///
/// * `host` - 主机地址
/// * `port` - 端口号
/// * `database` - 数据库名
/// * `user` - 用户名
/// * `password` - 密码
pub fn mysql_config<S: Into<String>>(
    host: S,
    port: u16,
    database: S,
    user: S,
    password: S,
) -> Result<OrmConfig, QuickOrmError> {
    OrmConfig::builder()
        .connection(
            ConnectionOptions::builder()
                .driver(DriverKind::MySql)
                .host(host)
                .port(port)
                .database(database)
                .user(user)
                .password(password)
                .build()?,
        )
        .logging(LoggingConfig::builder().level(LogLevel::Info).console(true).build()?)
        .debug_mutations(false)
        .query_log_capacity(256)
        .build()
}
