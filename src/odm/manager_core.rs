//! # ORM管理器核心实现
//!
//! 管理器持有数据库门面、表结构缓存和模型注册表。模型在首次使用时规范化：
//! 读取表结构，解析关系目标并推导外键，编译验证规则。

use crate::config::OrmConfig;
use crate::database::Database;
use crate::error::QuickOrmResult;
use crate::executor::SqlExecutor;
use crate::i18n::{t, tf};
use crate::model::relation::{self, RelationDescriptor, RelationKind};
use crate::model::{ModelDefinition, ModelDump, ModelInfo, ModelRegistry, Record};
use crate::table::{SchemaCache, TableSchema};
use crate::types::DataValue;
use crate::validation::{FieldRules, Rule};
use rat_logger::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

/// ORM管理器
pub struct OrmManager {
    db: Database,
    schemas: SchemaCache,
    registry: ModelRegistry,
}

impl OrmManager {
    /// 用数据库门面创建管理器
    pub fn new(db: Database) -> Self {
        info!("创建ORM管理器: 执行器={}", db.executor().name());
        Self {
            db,
            schemas: SchemaCache::new(),
            registry: ModelRegistry::new(),
        }
    }

    /// 按配置创建管理器并连接
    pub async fn connect(executor: Arc<dyn SqlExecutor>, config: &OrmConfig) -> QuickOrmResult<Self> {
        let db = Database::with_config(executor, config);
        db.connect(&config.connection).await?;
        Ok(Self::new(db))
    }

    /// 数据库门面
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// 表结构缓存
    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    /// 模型注册表
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// 注册模型定义
    pub fn register_model(&self, definition: ModelDefinition) -> QuickOrmResult<()> {
        self.registry.register(definition)
    }

    /// 注册具名验证回调，需在引用它的模型首次使用前注册
    pub fn register_callback<F>(&self, name: &str, callback: F)
    where
        F: Fn(&DataValue, &[DataValue]) -> bool + Send + Sync + 'static,
    {
        self.registry.register_callback(name, callback);
    }

    /// 规范化后的模型信息，首次调用时读取表结构
    pub async fn model(&self, name: &str) -> QuickOrmResult<Arc<ModelInfo>> {
        if let Some(info) = self.registry.info(name) {
            return Ok(info);
        }
        let definition = self
            .registry
            .definition(name)
            .ok_or_else(|| crate::orm_error!(config, tf("error.unknown_model", &[("model", name)])))?;
        let info = self.normalize(&definition).await?;
        Ok(self.registry.store_info(info))
    }

    async fn schema_of(&self, definition: &ModelDefinition) -> QuickOrmResult<Arc<TableSchema>> {
        self.schemas
            .instance(&self.db, &definition.table_name(), definition.name())
            .await
    }

    async fn normalize(&self, definition: &ModelDefinition) -> QuickOrmResult<ModelInfo> {
        let name = definition.name();
        let short_name = relation::short_name(name).to_string();
        let schema = self.schema_of(definition).await?;

        let mut relations = Vec::with_capacity(definition.relations.len());
        for kind in RelationKind::ALL {
            for (declared_kind, declaration) in &definition.relations {
                if *declared_kind != kind {
                    continue;
                }
                relation::check_declaration(name, kind, declaration)?;

                let target = self.registry.resolve(name, declaration.target()).ok_or_else(|| {
                    crate::orm_error!(
                        config,
                        tf("error.unknown_model", &[("model", declaration.target())])
                    )
                })?;

                let foreign_key = match &declaration.foreign_key {
                    Some(foreign_key) => foreign_key.clone(),
                    None => {
                        let target_primary_key = match kind {
                            RelationKind::BelongsTo => {
                                let target_definition = self.registry.definition(&target).ok_or_else(|| {
                                    crate::orm_error!(config, tf("error.unknown_model", &[("model", target.as_str())]))
                                })?;
                                let target_schema = self.schema_of(&target_definition).await?;
                                target_schema.primary_key().map(str::to_string)
                            }
                            _ => None,
                        };
                        relation::default_foreign_key(
                            kind,
                            &short_name,
                            schema.primary_key(),
                            &declaration.alias,
                            target_primary_key.as_deref(),
                        )
                        .ok_or_else(|| {
                            crate::orm_error!(
                                config,
                                format!("{} ({} -> {})", t("error.no_primary_key"), name, target)
                            )
                        })?
                    }
                };

                let descriptor = RelationDescriptor::new(
                    kind,
                    &declaration.alias,
                    &target,
                    foreign_key,
                    declaration.options.clone(),
                );
                debug!(
                    "规范化关系: {} {} {} -> {} (外键 {})",
                    name,
                    kind.as_str(),
                    descriptor.attach_as,
                    descriptor.model,
                    descriptor.foreign_key
                );
                relations.push(descriptor);
            }
        }

        let mut rules = Vec::with_capacity(definition.rules.len());
        for (field, declarations) in &definition.rules {
            if !schema.has_field(field) {
                let message = format!("表 {} 中没有该字段", schema.name());
                return Err(crate::orm_error!(
                    config,
                    tf("error.unknown_rule", &[("field", field.as_str()), ("message", message.as_str())])
                ));
            }
            let mut compiled = Vec::with_capacity(declarations.len());
            for declaration in declarations {
                compiled.push(Rule::compile(field, declaration.clone(), |callback| {
                    self.registry.callback(callback)
                })?);
            }
            rules.push(FieldRules {
                field: field.clone(),
                rules: compiled,
            });
        }

        info!(
            "模型规范化完成: {} (表 {}, 关系 {}, 规则字段 {})",
            name,
            schema.name(),
            relations.len(),
            rules.len()
        );

        Ok(ModelInfo {
            name: name.to_string(),
            short_name,
            table_name: schema.name().to_string(),
            schema,
            relations,
            rules,
            hooks: definition.hooks.clone(),
        })
    }

    /// 用默认值和给定字段值构造新记录
    pub async fn create(&self, model: &str, values: Vec<(&str, DataValue)>) -> QuickOrmResult<Record> {
        let info = self.model(model).await?;
        Record::new(
            info,
            values
                .into_iter()
                .map(|(field, value)| (field.to_string(), value))
                .collect(),
        )
    }

    /// 表名
    pub async fn table_name(&self, model: &str) -> QuickOrmResult<String> {
        Ok(self.model(model).await?.table_name().to_string())
    }

    /// 主键字段
    pub async fn primary_key(&self, model: &str) -> QuickOrmResult<Option<String>> {
        Ok(self.model(model).await?.primary_key().map(str::to_string))
    }

    /// 字段列表
    pub async fn fields(&self, model: &str) -> QuickOrmResult<Vec<String>> {
        Ok(self.model(model).await?.fields())
    }

    /// 缓存的行数
    pub async fn row_count(&self, model: &str) -> QuickOrmResult<i64> {
        Ok(self.model(model).await?.row_count())
    }

    /// 默认记录
    pub async fn default_record(&self, model: &str) -> QuickOrmResult<HashMap<String, DataValue>> {
        Ok(self.model(model).await?.default_record())
    }

    /// 模型调试快照
    pub async fn dump(&self, model: &str) -> QuickOrmResult<ModelDump> {
        Ok(self.model(model).await?.dump())
    }

    /// 在表外部写入后重新统计行数
    pub async fn update_row_count(&self, model: &str) -> QuickOrmResult<i64> {
        let info = self.model(model).await?;
        self.schemas.update_row_count(&self.db, info.table_name()).await
    }
}

impl std::fmt::Debug for OrmManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrmManager")
            .field("executor", &self.db.executor().name())
            .field("models", &self.registry.model_names())
            .field("schemas", &self.schemas.len())
            .finish()
    }
}
