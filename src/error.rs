//! 错误类型定义
//!
//! 统一的错误枚举，所有可对用户展示的消息都经由 i18n 模块翻译。
//! 验证失败不属于错误，它以 `ValidationErrors` 的形式返回。

use thiserror::Error;

/// rat_quickorm 错误类型
#[derive(Error, Debug)]
pub enum QuickOrmError {
    /// 模型/关系/验证规则的声明有误
    #[error("{}", translate("error.config", &[("message", .message)]))]
    ConfigurationError { message: String },

    /// 表结构无法读取（例如表不存在）
    #[error("{}", translate("error.schema", &[("table", .table), ("message", .message)]))]
    SchemaError { table: String, message: String },

    /// 执行器未连接或连接失败
    #[error("{}", translate("error.connection", &[("message", .message)]))]
    ConnectionError { message: String },

    /// 语句执行失败，携带出错的语句文本
    #[error("{}", translate("error.query", &[("sql", .sql), ("message", .message)]))]
    QueryError { sql: String, message: String },

    /// 访问了模型上不存在的字段或关系
    #[error("{}", translate("error.field_access", &[("model", .model), ("field", .field)]))]
    FieldAccessError { model: String, field: String },

    /// 持久化前置条件不满足（例如缺少主键）
    #[error("{}", translate("error.persistence", &[("model", .model), ("message", .message)]))]
    PersistenceError { model: String, message: String },

    /// 序列化/反序列化失败
    #[error("{}", translate("error.serialization", &[("message", .message)]))]
    SerializationError { message: String },

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),
}

/// rat_quickorm 结果类型
pub type QuickOrmResult<T> = Result<T, QuickOrmError>;

fn translate(key: &str, args: &[(&str, &String)]) -> String {
    let pairs: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();
    crate::i18n::tf(key, &pairs)
}

impl From<serde_json::Error> for QuickOrmError {
    fn from(err: serde_json::Error) -> Self {
        QuickOrmError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for QuickOrmError {
    fn from(err: toml::de::Error) -> Self {
        QuickOrmError::ConfigurationError {
            message: err.to_string(),
        }
    }
}

impl QuickOrmError {
    /// 错误类别，便于日志和测试中匹配
    pub fn kind(&self) -> &'static str {
        match self {
            QuickOrmError::ConfigurationError { .. } => "configuration",
            QuickOrmError::SchemaError { .. } => "schema",
            QuickOrmError::ConnectionError { .. } => "connection",
            QuickOrmError::QueryError { .. } => "query",
            QuickOrmError::FieldAccessError { .. } => "field_access",
            QuickOrmError::PersistenceError { .. } => "persistence",
            QuickOrmError::SerializationError { .. } => "serialization",
            QuickOrmError::IoError(_) => "io",
        }
    }
}

/// 快速构建错误的宏
#[macro_export]
macro_rules! orm_error {
    (config, $msg:expr) => {
        $crate::error::QuickOrmError::ConfigurationError {
            message: $msg.to_string(),
        }
    };
    (schema, $table:expr, $msg:expr) => {
        $crate::error::QuickOrmError::SchemaError {
            table: $table.to_string(),
            message: $msg.to_string(),
        }
    };
    (connection, $msg:expr) => {
        $crate::error::QuickOrmError::ConnectionError {
            message: $msg.to_string(),
        }
    };
    (query, $sql:expr, $msg:expr) => {
        $crate::error::QuickOrmError::QueryError {
            sql: $sql.to_string(),
            message: $msg.to_string(),
        }
    };
    (field, $model:expr, $field:expr) => {
        $crate::error::QuickOrmError::FieldAccessError {
            model: $model.to_string(),
            field: $field.to_string(),
        }
    };
    (persistence, $model:expr, $msg:expr) => {
        $crate::error::QuickOrmError::PersistenceError {
            model: $model.to_string(),
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::QuickOrmError::SerializationError {
            message: $msg.to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_builds_variants() {
        let err = crate::orm_error!(query, "select 1", "boom");
        assert_eq!(err.kind(), "query");
        match err {
            QuickOrmError::QueryError { sql, message } => {
                assert_eq!(sql, "select 1");
                assert_eq!(message, "boom");
            }
            other => panic!("意外的错误类型: {:?}", other),
        }

        let err = crate::orm_error!(field, "blog::User", "nickname");
        assert!(matches!(err, QuickOrmError::FieldAccessError { .. }));
    }

    #[test]
    fn test_display_contains_arguments() {
        crate::init();
        crate::i18n::set_language("en-US");
        let err = crate::orm_error!(schema, "users", "table does not exist");
        let text = err.to_string();
        assert!(text.contains("users"), "{}", text);
        assert!(text.contains("table does not exist"), "{}", text);
    }
}
