//! 模型定义
//!
//! 一个模型由名称、表名、三类关系、字段验证规则和生命周期钩子组成，
//! 注册到 [`crate::odm::OrmManager`] 后在首次使用时规范化

use crate::model::record::Record;
use crate::model::relation::{RelationDeclaration, RelationKind};
use crate::validation::RuleDeclaration;
use std::fmt;
use std::sync::Arc;

/// 记录生命周期钩子
pub type RecordHook = Arc<dyn Fn(&mut Record) + Send + Sync>;

/// 按注册顺序执行的生命周期钩子
#[derive(Clone, Default)]
pub struct ModelHooks {
    /// 构造时，覆盖字段值之前
    pub before_construct: Vec<RecordHook>,
    /// 构造时，覆盖字段值之后
    pub after_construct: Vec<RecordHook>,
    /// 保存开始时
    pub before_save: Vec<RecordHook>,
    /// 保存结束时
    pub after_save: Vec<RecordHook>,
}

impl ModelHooks {
    /// 依次执行一组钩子
    pub fn run(hooks: &[RecordHook], record: &mut Record) {
        for hook in hooks {
            hook(record);
        }
    }
}

impl fmt::Debug for ModelHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHooks")
            .field("before_construct", &self.before_construct.len())
            .field("after_construct", &self.after_construct.len())
            .field("before_save", &self.before_save.len())
            .field("after_save", &self.after_save.len())
            .finish()
    }
}

/// 模型定义
///
/// # 示例
///
/// ```
/// use rat_quickorm::{ModelDefinition, RelationDeclaration, RuleDeclaration};
///
/// let post = ModelDefinition::new("blog::Post")
///     .belongs_to(RelationDeclaration::new("Author").model("User"))
///     .validate("title", vec![RuleDeclaration::Required, RuleDeclaration::MaxLength(128)]);
/// assert_eq!(post.table_name(), "posts");
/// ```
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    pub(crate) name: String,
    pub(crate) table_name: Option<String>,
    pub(crate) relations: Vec<(RelationKind, RelationDeclaration)>,
    pub(crate) rules: Vec<(String, Vec<RuleDeclaration>)>,
    pub(crate) hooks: ModelHooks,
}

impl ModelDefinition {
    /// 创建模型定义，名称可带命名空间（例如 `blog::User`）
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            table_name: None,
            relations: Vec::new(),
            rules: Vec::new(),
            hooks: ModelHooks::default(),
        }
    }

    /// 完整名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 表名，未指定时由短名推导（`UserGroup` -> `user_groups`）
    pub fn table_name(&self) -> String {
        match &self.table_name {
            Some(table) => table.clone(),
            None => crate::inflector::tableize(crate::model::relation::short_name(&self.name)),
        }
    }

    /// 指定表名
    pub fn table(mut self, table_name: &str) -> Self {
        self.table_name = Some(table_name.to_string());
        self
    }

    /// 声明一对一关系
    pub fn has_one<R: Into<RelationDeclaration>>(mut self, relation: R) -> Self {
        self.relations.push((RelationKind::HasOne, relation.into()));
        self
    }

    /// 声明一对多关系
    pub fn has_many<R: Into<RelationDeclaration>>(mut self, relation: R) -> Self {
        self.relations.push((RelationKind::HasMany, relation.into()));
        self
    }

    /// 声明从属关系
    pub fn belongs_to<R: Into<RelationDeclaration>>(mut self, relation: R) -> Self {
        self.relations.push((RelationKind::BelongsTo, relation.into()));
        self
    }

    /// 为字段追加验证规则
    pub fn validate(mut self, field: &str, rules: Vec<RuleDeclaration>) -> Self {
        match self.rules.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => existing.extend(rules),
            None => self.rules.push((field.to_string(), rules)),
        }
        self
    }

    /// 构造前钩子
    pub fn before_construct<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) + Send + Sync + 'static,
    {
        self.hooks.before_construct.push(Arc::new(hook));
        self
    }

    /// 构造后钩子
    pub fn after_construct<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) + Send + Sync + 'static,
    {
        self.hooks.after_construct.push(Arc::new(hook));
        self
    }

    /// 保存前钩子
    pub fn before_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) + Send + Sync + 'static,
    {
        self.hooks.before_save.push(Arc::new(hook));
        self
    }

    /// 保存后钩子
    pub fn after_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) + Send + Sync + 'static,
    {
        self.hooks.after_save.push(Arc::new(hook));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_inferred_from_short_name() {
        assert_eq!(ModelDefinition::new("blog::UserGroup").table_name(), "user_groups");
        assert_eq!(ModelDefinition::new("blog::User").table("members").table_name(), "members");
    }

    #[test]
    fn test_rules_merge_per_field() {
        let definition = ModelDefinition::new("User")
            .validate("name", vec![RuleDeclaration::Required])
            .validate("password", vec![RuleDeclaration::MinLength(6)])
            .validate("name", vec![RuleDeclaration::MinLength(3)]);
        assert_eq!(definition.rules.len(), 2);
        assert_eq!(
            definition.rules[0].1,
            vec![RuleDeclaration::Required, RuleDeclaration::MinLength(3)]
        );
    }

    #[test]
    fn test_relations_keep_declaration_order() {
        let definition = ModelDefinition::new("User")
            .has_many(RelationDeclaration::new("Post").foreign_key("author_id"))
            .has_one("Profile");
        assert_eq!(definition.relations[0].0, RelationKind::HasMany);
        assert_eq!(definition.relations[1].1.target(), "Profile");
    }
}
