//! 表结构缓存
//!
//! 按 (表名, 模型) 懒加载并永久缓存。并发的首次访问可能重复执行
//! `describe`，但只保留先写入的那一份

use crate::database::Database;
use crate::error::{QuickOrmError, QuickOrmResult};
use crate::query::{ConditionCompiler, ROW_COUNT_LABEL};
use crate::table::schema::TableSchema;
use dashmap::DashMap;
use rat_logger::{debug, info};
use std::sync::Arc;

/// 表结构缓存
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: DashMap<(String, String), Arc<TableSchema>>,
}

impl SchemaCache {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取表结构，未缓存时读取表结构和行数
    ///
    /// 表不存在时返回 `SchemaError`
    pub async fn instance(&self, db: &Database, table: &str, model: &str) -> QuickOrmResult<Arc<TableSchema>> {
        let key = (table.to_string(), model.to_string());
        if let Some(schema) = self.schemas.get(&key).map(|entry| entry.value().clone()) {
            return Ok(schema);
        }

        let sql = ConditionCompiler::describe(table)?;
        let rows = match db.query(&sql).await {
            Ok(output) => output.into_rows(),
            Err(QuickOrmError::QueryError { message, .. }) => {
                return Err(crate::orm_error!(schema, table, message));
            }
            Err(e) => return Err(e),
        };
        let schema = Arc::new(TableSchema::from_describe(table, model, &rows)?);
        info!(
            "加载表结构: 表={}, 模型={}, 字段数={}, 主键={:?}",
            table,
            model,
            schema.columns().len(),
            schema.primary_key()
        );
        Self::refresh_row_count(db, &schema).await?;

        // 并发首次加载时保留先写入的实例
        let cached = self.schemas.entry(key).or_insert(schema).value().clone();
        Ok(cached)
    }

    /// 已缓存的表结构
    pub fn get(&self, table: &str, model: &str) -> Option<Arc<TableSchema>> {
        self.schemas
            .get(&(table.to_string(), model.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// 重新统计该表在缓存中所有实例的行数
    pub async fn update_row_count(&self, db: &Database, table: &str) -> QuickOrmResult<i64> {
        let schemas: Vec<Arc<TableSchema>> = self
            .schemas
            .iter()
            .filter(|entry| entry.key().0 == table)
            .map(|entry| entry.value().clone())
            .collect();
        if schemas.is_empty() {
            return Err(crate::orm_error!(schema, table, crate::i18n::t("error.table_not_exist")));
        }

        let mut count = 0;
        for schema in &schemas {
            count = Self::refresh_row_count(db, schema).await?;
        }
        Ok(count)
    }

    /// 插入成功后为该表的所有缓存实例加一
    pub fn increment_row_count(&self, table: &str) {
        for entry in self.schemas.iter().filter(|entry| entry.key().0 == table) {
            entry.value().increment_row_count();
        }
    }

    /// 删除成功后为该表的所有缓存实例减一
    pub fn decrement_row_count(&self, table: &str) {
        for entry in self.schemas.iter().filter(|entry| entry.key().0 == table) {
            entry.value().decrement_row_count();
        }
    }

    /// 已缓存的实例数
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    async fn refresh_row_count(db: &Database, schema: &TableSchema) -> QuickOrmResult<i64> {
        let sql = ConditionCompiler::count(schema.name())?;
        let mut output = db.query(&sql).await?;
        let count = output
            .result_set()
            .and_then(|rs| rs.get_row())
            .and_then(|row| row.get(ROW_COUNT_LABEL).and_then(|v| v.as_i64()))
            .unwrap_or(0);
        schema.set_row_count(count);
        debug!("刷新行数: 表={}, 行数={}", schema.name(), count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::memory_config;
    use crate::executor::{ColumnSpec, MemoryExecutor};

    async fn database() -> (Arc<MemoryExecutor>, Database) {
        crate::init();
        let executor = Arc::new(MemoryExecutor::new());
        executor.create_table(
            "users",
            vec![
                ColumnSpec::new("id", "int(11)").primary_key().auto_increment(),
                ColumnSpec::new("name", "varchar(64)"),
                ColumnSpec::new("user_group_id", "int(11)").default_value(1),
            ],
        );
        let config = memory_config(false).unwrap();
        let db = Database::with_config(executor.clone(), &config);
        db.connect(&config.connection).await.unwrap();
        (executor, db)
    }

    #[tokio::test]
    async fn test_instance_is_cached_per_model() {
        let (_, db) = database().await;
        db.query("insert into `users` (`name`) values ('Bob')").await.unwrap();

        let cache = SchemaCache::new();
        let first = cache.instance(&db, "users", "User").await.unwrap();
        assert_eq!(first.primary_key(), Some("id"));
        assert_eq!(first.row_count(), 1);

        let queries = db.queries().len();
        let again = cache.instance(&db, "users", "User").await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(db.queries().len(), queries);

        let other = cache.instance(&db, "users", "Admin").await.unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_table_is_schema_error() {
        let (_, db) = database().await;
        let cache = SchemaCache::new();
        let err = cache.instance(&db, "nothing", "Nothing").await.unwrap_err();
        assert!(matches!(err, QuickOrmError::SchemaError { .. }));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_row_count_maintenance() {
        let (_, db) = database().await;
        let cache = SchemaCache::new();
        let schema = cache.instance(&db, "users", "User").await.unwrap();
        assert_eq!(schema.row_count(), 0);

        cache.increment_row_count("users");
        assert_eq!(schema.row_count(), 1);
        cache.decrement_row_count("users");
        assert_eq!(schema.row_count(), 0);

        db.query("insert into `users` (`name`) values ('Bob')").await.unwrap();
        db.query("insert into `users` (`name`) values ('Jim')").await.unwrap();
        assert_eq!(cache.update_row_count(&db, "users").await.unwrap(), 2);
        assert_eq!(schema.row_count(), 2);
    }
}
