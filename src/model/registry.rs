//! 模型注册表
//!
//! 保存模型定义、规范化后的模型信息和具名验证回调

use crate::error::QuickOrmResult;
use crate::model::definition::{ModelDefinition, ModelHooks};
use crate::model::relation::{self, RelationDescriptor, RelationKind};
use crate::security::IdentifierValidator;
use crate::table::TableSchema;
use crate::types::DataValue;
use crate::validation::{FieldRules, ValidationCallback};
use dashmap::DashMap;
use rat_logger::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// 规范化后的模型信息
#[derive(Debug)]
pub struct ModelInfo {
    pub(crate) name: String,
    pub(crate) short_name: String,
    pub(crate) table_name: String,
    pub(crate) schema: Arc<TableSchema>,
    pub(crate) relations: Vec<RelationDescriptor>,
    pub(crate) rules: Vec<FieldRules>,
    pub(crate) hooks: ModelHooks,
}

impl ModelInfo {
    /// 完整名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 去掉命名空间的短名，也是查询语句中的表别名
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// 表名
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// 表结构
    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    /// 主键字段
    pub fn primary_key(&self) -> Option<&str> {
        self.schema.primary_key()
    }

    /// 字段列表
    pub fn fields(&self) -> Vec<String> {
        self.schema.fields()
    }

    /// 缓存的行数
    pub fn row_count(&self) -> i64 {
        self.schema.row_count()
    }

    /// 默认记录
    pub fn default_record(&self) -> HashMap<String, DataValue> {
        self.schema.default_record()
    }

    /// 全部关系，按一对一、一对多、从属的顺序
    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    /// 某一类关系
    pub fn relations_of(&self, kind: RelationKind) -> impl Iterator<Item = &RelationDescriptor> {
        self.relations.iter().filter(move |r| r.kind == kind)
    }

    /// 按挂载名查找关系
    pub fn relation(&self, attach_as: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|r| r.attach_as == attach_as)
    }

    /// 字段验证规则
    pub fn rules(&self) -> &[FieldRules] {
        &self.rules
    }

    /// 生命周期钩子
    pub fn hooks(&self) -> &ModelHooks {
        &self.hooks
    }

    /// 名称是否可以在记录上访问：主键别名、表字段或关系挂载名
    pub fn is_accessible(&self, name: &str) -> bool {
        name == crate::model::record::PRIMARY_KEY_ALIAS
            || self.schema.has_field(name)
            || self.relation(name).is_some()
    }

    /// 当前状态的调试快照
    pub fn dump(&self) -> ModelDump {
        ModelDump {
            name: self.name.clone(),
            short_name: self.short_name.clone(),
            table_name: self.table_name.clone(),
            primary_key: self.primary_key().map(str::to_string),
            fields: self.fields(),
            row_count: self.row_count(),
            relations: self.relations.clone(),
            rules: self
                .rules
                .iter()
                .map(|field_rules| {
                    let rules = field_rules
                        .rules
                        .iter()
                        .map(|rule| (rule.name().to_string(), rule.declaration().argument()))
                        .collect();
                    (field_rules.field.clone(), rules)
                })
                .collect(),
            hooks: format!("{:?}", self.hooks),
        }
    }
}

/// 模型信息的可序列化快照
#[derive(Debug, Clone, Serialize)]
pub struct ModelDump {
    /// 完整名称
    pub name: String,
    /// 短名
    pub short_name: String,
    /// 表名
    pub table_name: String,
    /// 主键
    pub primary_key: Option<String>,
    /// 字段
    pub fields: Vec<String>,
    /// 行数
    pub row_count: i64,
    /// 关系
    pub relations: Vec<RelationDescriptor>,
    /// 规则：字段 -> [(规则名, 参数)]
    pub rules: Vec<(String, Vec<(String, DataValue)>)>,
    /// 钩子数量
    pub hooks: String,
}

/// 模型注册表
#[derive(Default)]
pub struct ModelRegistry {
    definitions: DashMap<String, Arc<ModelDefinition>>,
    infos: DashMap<String, Arc<ModelInfo>>,
    callbacks: DashMap<String, ValidationCallback>,
}

impl ModelRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模型定义，同名定义会被替换并丢弃已规范化的信息
    pub fn register(&self, definition: ModelDefinition) -> QuickOrmResult<()> {
        for segment in definition.name.split("::") {
            IdentifierValidator::validate_table_name(segment).map_err(|_| {
                crate::orm_error!(config, format!("无效的模型名: {}", definition.name))
            })?;
        }
        IdentifierValidator::validate_table_name(&definition.table_name()).map_err(|_| {
            crate::orm_error!(config, format!("模型 {} 的表名无效", definition.name))
        })?;

        let name = definition.name.clone();
        if self.definitions.contains_key(&name) {
            debug!("模型已存在，将替换定义: {}", name);
        }
        self.infos.remove(&name);
        self.definitions.insert(name.clone(), Arc::new(definition));
        debug!("注册模型: {}", name);
        Ok(())
    }

    /// 模型定义
    pub fn definition(&self, name: &str) -> Option<Arc<ModelDefinition>> {
        self.definitions.get(name).map(|entry| entry.value().clone())
    }

    /// 是否已注册
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// 所有已注册的模型名
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// 解析关系目标：字面名称优先，其次是所属模型命名空间下的同名模型
    pub fn resolve(&self, owner: &str, literal: &str) -> Option<String> {
        relation::resolve_model(owner, literal, |name| self.contains(name))
    }

    /// 已规范化的模型信息
    pub fn info(&self, name: &str) -> Option<Arc<ModelInfo>> {
        self.infos.get(name).map(|entry| entry.value().clone())
    }

    /// 保存规范化的模型信息，已存在时保留先写入的
    pub(crate) fn store_info(&self, info: ModelInfo) -> Arc<ModelInfo> {
        self.infos
            .entry(info.name.clone())
            .or_insert_with(|| Arc::new(info))
            .value()
            .clone()
    }

    /// 注册具名验证回调
    pub fn register_callback<F>(&self, name: &str, callback: F)
    where
        F: Fn(&DataValue, &[DataValue]) -> bool + Send + Sync + 'static,
    {
        self.callbacks.insert(name.to_string(), Arc::new(callback));
    }

    /// 查找具名验证回调
    pub fn callback(&self, name: &str) -> Option<ValidationCallback> {
        self.callbacks.get(name).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let registry = ModelRegistry::new();
        registry.register(ModelDefinition::new("blog::User")).unwrap();
        registry.register(ModelDefinition::new("blog::Post")).unwrap();

        assert!(registry.contains("blog::User"));
        assert_eq!(registry.resolve("blog::Post", "User").as_deref(), Some("blog::User"));
        assert_eq!(registry.resolve("blog::Post", "Comment"), None);
        assert_eq!(registry.model_names(), vec!["blog::Post", "blog::User"]);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let registry = ModelRegistry::new();
        let err = registry.register(ModelDefinition::new("blog::")).unwrap_err();
        assert_eq!(err.kind(), "configuration");
        let err = registry
            .register(ModelDefinition::new("User").table("users;drop"))
            .unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_callbacks() {
        let registry = ModelRegistry::new();
        registry.register_callback("is_multiple_of_5", |value, _| {
            value.as_i64().is_some_and(|n| n % 5 == 0)
        });
        let callback = registry.callback("is_multiple_of_5").unwrap();
        assert!(callback(&DataValue::Int(10), &[]));
        assert!(!callback(&DataValue::Int(7), &[]));
        assert!(registry.callback("missing").is_none());
    }
}
