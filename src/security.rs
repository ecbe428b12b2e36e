//! 标识符安全验证工具
//!
//! 语句中的表名、别名和字段名都以反引号包裹后直接拼接，
//! 拼接前在这里检查，防止通过标识符注入语句片段

use crate::error::{QuickOrmError, QuickOrmResult};

/// 标识符最大长度（MySQL 限制）
const MAX_IDENTIFIER_LEN: usize = 64;

/// 标识符安全验证器
pub struct IdentifierValidator;

impl IdentifierValidator {
    /// 验证字段名的安全性
    ///
    /// # 参数
    /// * `field_name` - 字段名
    ///
    /// # 返回值
    /// * `Ok(())` - 字段名安全
    /// * `Err(QuickOrmError::QueryError)` - 字段名包含非法字符
    pub fn validate_field_name(field_name: &str) -> QuickOrmResult<()> {
        Self::validate("字段名", field_name)
    }

    /// 验证表名或表别名的安全性
    pub fn validate_table_name(table_name: &str) -> QuickOrmResult<()> {
        Self::validate("表名", table_name)
    }

    /// 获取安全的字段标识符（已加反引号）
    pub fn safe_field(field_name: &str) -> QuickOrmResult<String> {
        Self::validate_field_name(field_name)?;
        Ok(format!("`{}`", field_name))
    }

    /// 获取安全的表标识符（已加反引号）
    pub fn safe_table(table_name: &str) -> QuickOrmResult<String> {
        Self::validate_table_name(table_name)?;
        Ok(format!("`{}`", table_name))
    }

    fn validate(kind: &str, name: &str) -> QuickOrmResult<()> {
        let Some(first) = name.chars().next() else {
            return Err(Self::reject(name, format!("{}不能为空", kind)));
        };

        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(Self::reject(
                name,
                format!("{}长度不能超过{}个字符", kind, MAX_IDENTIFIER_LEN),
            ));
        }

        if first.is_ascii_digit() {
            return Err(Self::reject(name, format!("{}不能以数字开头", kind)));
        }

        for (i, ch) in name.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                return Err(Self::reject(
                    name,
                    format!("{}包含非法字符 '{}' 在位置 {}", kind, ch, i),
                ));
            }
        }

        Ok(())
    }

    fn reject(name: &str, message: String) -> QuickOrmError {
        crate::orm_error!(query, name, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_validation() {
        assert!(IdentifierValidator::validate_field_name("name").is_ok());
        assert!(IdentifierValidator::validate_field_name("user_group_id").is_ok());
        assert!(IdentifierValidator::validate_field_name("createdAt").is_ok());

        assert!(IdentifierValidator::validate_field_name("").is_err());
        assert!(IdentifierValidator::validate_field_name("123name").is_err());
        assert!(IdentifierValidator::validate_field_name("na-me").is_err());
        assert!(IdentifierValidator::validate_field_name("id` = 1 or `1").is_err());
        assert!(IdentifierValidator::validate_field_name(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_rejection_is_query_error() {
        let err = IdentifierValidator::validate_table_name("users; drop").unwrap_err();
        assert!(matches!(err, QuickOrmError::QueryError { .. }));
    }

    #[test]
    fn test_safe_identifier_generation() {
        assert_eq!(IdentifierValidator::safe_field("name").unwrap(), "`name`");
        assert_eq!(IdentifierValidator::safe_table("users").unwrap(), "`users`");
        assert!(IdentifierValidator::safe_field("na me").is_err());
    }
}
