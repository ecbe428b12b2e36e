//! 关系声明与规范化
//!
//! 声明可以只写目标模型名（别名即模型名），也可以给出别名并指定
//! 模型、外键和默认查询选项。规范化后的 [`RelationDescriptor`]
//! 是之后所有级联查询和级联保存使用的唯一形式。

use crate::error::QuickOrmResult;
use crate::inflector;
use crate::security::IdentifierValidator;
use crate::types::FindOptions;
use serde::{Deserialize, Serialize};

/// 关系类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// 一对一，外键在对方表
    HasOne,
    /// 一对多，外键在对方表
    HasMany,
    /// 从属，外键在本表
    BelongsTo,
}

impl RelationKind {
    /// 级联查询时的处理顺序
    pub const ALL: [RelationKind; 3] = [RelationKind::HasOne, RelationKind::HasMany, RelationKind::BelongsTo];

    /// 名称，用于日志
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
            RelationKind::BelongsTo => "belongs_to",
        }
    }
}

/// 关系声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDeclaration {
    /// 别名
    pub alias: String,
    /// 目标模型，缺省时与别名相同
    pub model: Option<String>,
    /// 外键，缺省时按命名规则推导
    pub foreign_key: Option<String>,
    /// 默认查询选项
    pub options: Option<FindOptions>,
}

impl RelationDeclaration {
    /// 以别名创建声明
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            model: None,
            foreign_key: None,
            options: None,
        }
    }

    /// 指定目标模型
    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// 指定外键
    pub fn foreign_key(mut self, foreign_key: &str) -> Self {
        self.foreign_key = Some(foreign_key.to_string());
        self
    }

    /// 指定默认查询选项
    pub fn options(mut self, options: FindOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// 声明中写的目标模型名
    pub fn target(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.alias)
    }
}

impl From<&str> for RelationDeclaration {
    fn from(model: &str) -> Self {
        RelationDeclaration::new(model)
    }
}

/// 规范化后的关系
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationDescriptor {
    /// 关系类别
    pub kind: RelationKind,
    /// 声明的别名
    pub alias: String,
    /// 记录上挂载关联记录使用的名称（一对多为复数形式）
    pub attach_as: String,
    /// 目标模型的完整名称
    pub model: String,
    /// 外键字段
    pub foreign_key: String,
    /// 查询关联记录的默认选项
    pub options: FindOptions,
}

impl RelationDescriptor {
    /// 构建规范化的关系
    ///
    /// 一对一和从属关系的选项强制为单条结果
    pub fn new(kind: RelationKind, alias: &str, model: &str, foreign_key: String, options: Option<FindOptions>) -> Self {
        let mut options = options.unwrap_or_default();
        if kind != RelationKind::HasMany {
            options.force_single();
        }
        Self {
            kind,
            alias: alias.to_string(),
            attach_as: attach_alias(kind, alias),
            model: model.to_string(),
            foreign_key,
            options,
        }
    }
}

/// 记录上挂载关联记录的名称
pub fn attach_alias(kind: RelationKind, alias: &str) -> String {
    match kind {
        RelationKind::HasMany => inflector::pluralize(alias),
        _ => alias.to_string(),
    }
}

/// 模型名去掉命名空间后的短名：`blog::User` -> `User`
pub fn short_name(model: &str) -> &str {
    model.rsplit("::").next().unwrap_or(model)
}

/// 模型名的命名空间前缀：`blog::User` -> `blog::`
pub fn namespace_of(model: &str) -> &str {
    &model[..model.len() - short_name(model).len()]
}

/// 解析目标模型名：先按字面查找，再加上所属模型的命名空间查找
pub fn resolve_model<F>(owner: &str, literal: &str, exists: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    if exists(literal) {
        return Some(literal.to_string());
    }
    let qualified = format!("{}{}", namespace_of(owner), literal);
    exists(&qualified).then_some(qualified)
}

/// 默认外键
///
/// 一对一和一对多为 `所属模型短名_所属主键`，从属为 `别名_目标主键`
pub fn default_foreign_key(
    kind: RelationKind,
    owner_short_name: &str,
    owner_primary_key: Option<&str>,
    alias: &str,
    target_primary_key: Option<&str>,
) -> Option<String> {
    match kind {
        RelationKind::BelongsTo => target_primary_key
            .map(|pk| format!("{}_{}", inflector::underscore(alias), pk)),
        _ => owner_primary_key
            .map(|pk| format!("{}_{}", inflector::underscore(owner_short_name), pk)),
    }
}

/// 检查声明本身的格式
pub fn check_declaration(owner: &str, kind: RelationKind, declaration: &RelationDeclaration) -> QuickOrmResult<()> {
    if declaration.alias.trim().is_empty() || declaration.target().trim().is_empty() {
        return Err(crate::orm_error!(
            config,
            format!("模型 {} 的 {} 关系声明缺少别名或模型", owner, kind.as_str())
        ));
    }
    if IdentifierValidator::validate_table_name(&declaration.alias).is_err() {
        return Err(crate::orm_error!(
            config,
            format!("模型 {} 的 {} 关系别名无效: {}", owner, kind.as_str(), declaration.alias)
        ));
    }
    if let Some(foreign_key) = &declaration.foreign_key {
        if IdentifierValidator::validate_field_name(foreign_key).is_err() {
            return Err(crate::orm_error!(
                config,
                format!("模型 {} 的 {} 关系外键无效: {}", owner, kind.as_str(), foreign_key)
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FindType, Limit};

    #[test]
    fn test_names() {
        assert_eq!(short_name("blog::User"), "User");
        assert_eq!(short_name("User"), "User");
        assert_eq!(namespace_of("blog::admin::User"), "blog::admin::");
        assert_eq!(namespace_of("User"), "");
    }

    #[test]
    fn test_resolve_model_with_namespace() {
        let known = ["blog::User", "blog::Post", "Shared"];
        let exists = |name: &str| known.contains(&name);
        assert_eq!(resolve_model("blog::Post", "User", exists).as_deref(), Some("blog::User"));
        assert_eq!(resolve_model("blog::Post", "Shared", exists).as_deref(), Some("Shared"));
        assert_eq!(resolve_model("blog::Post", "Comment", exists), None);
    }

    #[test]
    fn test_default_foreign_keys() {
        assert_eq!(
            default_foreign_key(RelationKind::HasMany, "UserGroup", Some("id"), "User", Some("id")).as_deref(),
            Some("user_group_id")
        );
        assert_eq!(
            default_foreign_key(RelationKind::BelongsTo, "Post", Some("id"), "Author", Some("id")).as_deref(),
            Some("author_id")
        );
        assert_eq!(default_foreign_key(RelationKind::HasOne, "Post", None, "Author", Some("id")), None);
    }

    #[test]
    fn test_single_semantics_forced() {
        let descriptor = RelationDescriptor::new(
            RelationKind::HasOne,
            "Post",
            "blog::Post",
            "author_id".to_string(),
            Some(FindOptions::new().order_by("id desc").limit(5)),
        );
        assert_eq!(descriptor.options.find_type, FindType::First);
        assert_eq!(descriptor.options.limit, Limit::Count(1));
        assert_eq!(descriptor.options.order_by.as_deref(), Some("id desc"));

        let descriptor =
            RelationDescriptor::new(RelationKind::HasMany, "Post", "blog::Post", "author_id".to_string(), None);
        assert_eq!(descriptor.attach_as, "Posts");
        assert_eq!(descriptor.options.find_type, FindType::All);
    }

    #[test]
    fn test_bad_declarations() {
        assert!(check_declaration("User", RelationKind::HasOne, &RelationDeclaration::new("")).is_err());
        assert!(check_declaration("User", RelationKind::HasOne, &RelationDeclaration::new("Po st")).is_err());
        assert!(check_declaration(
            "User",
            RelationKind::HasOne,
            &RelationDeclaration::new("Post").foreign_key("x;y")
        )
        .is_err());
        assert!(check_declaration("User", RelationKind::HasOne, &"Post".into()).is_ok());
    }
}
