//! # 全局配置构建器模块
//!
//! 提供 ORM 全局配置的构建器实现，支持链式调用和严格验证

use crate::config::core::{ConnectionOptions, LoggingConfig, OrmConfig};
use crate::error::QuickOrmError;
use rat_logger::info;

/// 全局配置构建器
///
/// 提供链式配置接口，支持流畅的API调用
#[derive(Debug)]
pub struct OrmConfigBuilder {
    connection: Option<ConnectionOptions>,
    logging: Option<LoggingConfig>,
    debug_mutations: Option<bool>,
    query_log_capacity: Option<usize>,
}
impl OrmConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            connection: None,
            logging: None,
            debug_mutations: None,
            query_log_capacity: None,
        }
    }

    /// 设置连接配置
    ///
    /// # 参数
    ///
    /// * `connection` - 连接配置
    pub fn connection(mut self, connection: ConnectionOptions) -> Self {
        self.connection = Some(connection);
        self
    }

    /// 设置日志配置
    ///
    /// # 参数
    ///
    /// * `logging` - 日志配置
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// 设置是否只记录而不执行写操作
    pub fn debug_mutations(mut self, debug_mutations: bool) -> Self {
        self.debug_mutations = Some(debug_mutations);
        self
    }

    /// 设置查询日志容量
    pub fn query_log_capacity(mut self, capacity: usize) -> Self {
        self.query_log_capacity = Some(capacity);
        self
    }

    /// 构建全局配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> Result<OrmConfig, QuickOrmError> {
        let connection = self
            .connection
            .ok_or_else(|| crate::orm_error!(config, "连接配置必须设置"))?;

        let logging = self
            .logging
            .ok_or_else(|| crate::orm_error!(config, "日志配置必须设置"))?;

        let debug_mutations = self
            .debug_mutations
            .ok_or_else(|| crate::orm_error!(config, "写操作调试选项必须设置"))?;

        let query_log_capacity = self
            .query_log_capacity
            .ok_or_else(|| crate::orm_error!(config, "查询日志容量必须设置"))?;

        info!(
            "创建ORM配置: 执行器={:?}, 写操作调试={}, 查询日志容量={}",
            connection.driver, debug_mutations, query_log_capacity
        );

        Ok(OrmConfig {
            connection,
            logging,
            debug_mutations,
            query_log_capacity,
        })
    }
}
impl Default for OrmConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
