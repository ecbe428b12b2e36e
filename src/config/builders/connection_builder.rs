//! # 连接配置构建器模块
//!
//! 提供连接配置的构建器实现，支持链式调用和严格验证

use crate::config::core::{ConnectionOptions, DriverKind};
use crate::error::QuickOrmError;
use rat_logger::info;

/// 连接配置构建器
///
/// 执行器类型必须显式设置；MySQL 还要求主机、端口、用户名和数据库名
#[derive(Debug)]
pub struct ConnectionOptionsBuilder {
    driver: Option<DriverKind>,
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
}

impl ConnectionOptionsBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            driver: None,
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
        }
    }

    /// 设置执行器类型
    pub fn driver(mut self, driver: DriverKind) -> Self {
        self.driver = Some(driver);
        self
    }

    /// 设置主机地址
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// 设置端口号
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// 设置用户名
    pub fn user<S: Into<String>>(mut self, user: S) -> Self {
        self.user = Some(user.into());
        self
    }

    /// 设置密码
    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    /// 设置数据库名
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// 构建连接配置
    ///
    /// # 错误
    ///
    /// 执行器类型未设置，或 MySQL 缺少必需项时返回错误
    pub fn build(self) -> Result<ConnectionOptions, QuickOrmError> {
        let driver = self.driver.ok_or_else(|| {
            crate::orm_error!(config, "执行器类型必须设置")
        })?;

        if driver == DriverKind::MySql {
            if self.host.as_deref().map_or(true, str::is_empty) {
                return Err(crate::orm_error!(config, "MySQL主机地址必须设置"));
            }
            if self.port.is_none() {
                return Err(crate::orm_error!(config, "MySQL端口号必须设置"));
            }
            if self.user.is_none() {
                return Err(crate::orm_error!(config, "MySQL用户名必须设置"));
            }
            if self.database.as_deref().map_or(true, str::is_empty) {
                return Err(crate::orm_error!(config, "MySQL数据库名必须设置"));
            }
        }

        info!("创建连接配置: 执行器={:?}, 主机={:?}, 数据库={:?}", driver, self.host, self.database);

        Ok(ConnectionOptions {
            driver,
            host: self.host,
            port: self.port,
            user: self.user,
            password: self.password,
            database: self.database,
        })
    }
}

impl Default for ConnectionOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
