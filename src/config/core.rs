//! # 配置管理模块 - 核心配置类型
//!
//! 提供统一的配置管理系统，支持构建器模式和链式配置
//! 严格遵循项目规范：所有配置项必须显式设置，严禁使用默认值

use crate::error::{QuickOrmError, QuickOrmResult};
use rat_logger::{info, LevelFilter, LoggerBuilder};
use rat_logger::handler::term::TermConfig;
use serde::{Deserialize, Serialize};

/// ORM 全局配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrmConfig {
    /// 为 true 时写操作只记录日志、不实际执行
    pub debug_mutations: bool,
    /// 查询日志保留的最大条数，0 表示不保留
    pub query_log_capacity: usize,
    /// 连接配置
    pub connection: ConnectionOptions,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 执行器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverKind {
    /// 内置内存执行器
    Memory,
    /// MySQL（需要 mysql-support 特性）
    MySql,
}

/// 连接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// 执行器类型
    pub driver: DriverKind,
    /// 主机地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// 端口号
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// 用户名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// 密码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// 数据库名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 是否输出到控制台
    pub console: bool,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 错误级别
    Error,
    /// 警告级别
    Warn,
    /// 信息级别
    Info,
    /// 调试级别
    Debug,
    /// 跟踪级别
    Trace,
}

impl LogLevel {
    /// 转换为 rat_logger 的级别过滤器
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl OrmConfig {
    /// 创建全局配置构建器
    pub fn builder() -> super::builders::OrmConfigBuilder {
        super::builders::OrmConfigBuilder::new()
    }

    /// 从配置文件加载配置
    ///
    /// 扩展名为 `toml` 时按 TOML 解析，其余按 JSON 解析
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn from_file<P: AsRef<std::path::Path>>(config_path: P) -> QuickOrmResult<Self> {
        let content = std::fs::read_to_string(config_path.as_ref())
            .map_err(QuickOrmError::IoError)?;

        let config: OrmConfig = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&content)
                .map_err(|e| crate::orm_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::orm_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };

        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, config_path: P) -> QuickOrmResult<()> {
        let content = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self)
                .map_err(|e| crate::orm_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::orm_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content)
            .map_err(QuickOrmError::IoError)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }
}

impl ConnectionOptions {
    /// 创建连接配置构建器
    pub fn builder() -> super::builders::ConnectionOptionsBuilder {
        super::builders::ConnectionOptionsBuilder::new()
    }
}

impl LoggingConfig {
    /// 创建日志配置构建器
    pub fn builder() -> super::builders::LoggingConfigBuilder {
        super::builders::LoggingConfigBuilder::new()
    }
}

/// 按日志配置初始化 rat_logger
///
/// 库本身从不初始化日志，这个函数供应用和测试使用；
/// `console` 为 false 时不安装任何处理器
pub fn init_logging(config: &LoggingConfig) -> QuickOrmResult<()> {
    if !config.console {
        return Ok(());
    }

    LoggerBuilder::new()
        .with_level(config.level.to_level_filter())
        .add_terminal_with_config(TermConfig::default())
        .init()
        .map_err(|e| crate::orm_error!(config, format!("日志初始化失败: {}", e)))
}
