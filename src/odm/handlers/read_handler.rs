//! # 读取操作处理器

use crate::error::QuickOrmResult;
use crate::model::{ModelInfo, PRIMARY_KEY_ALIAS, Record};
use crate::odm::manager_core::OrmManager;
use crate::query::ConditionCompiler;
use crate::types::{DataValue, FindOptions, FindType};
use futures::future::{BoxFuture, FutureExt};
use rat_logger::debug;
use std::collections::HashSet;
use std::sync::Arc;

/// 查询结果，形态由 [`FindType`] 决定
#[derive(Debug, Clone, PartialEq)]
pub enum FindResult {
    /// 第一条记录（可能没有）
    First(Option<Record>),
    /// 全部记录
    All(Vec<Record>),
}

impl FindResult {
    /// 取第一条记录
    pub fn into_first(self) -> Option<Record> {
        match self {
            FindResult::First(record) => record,
            FindResult::All(records) => records.into_iter().next(),
        }
    }

    /// 取全部记录
    pub fn into_all(self) -> Vec<Record> {
        match self {
            FindResult::First(record) => record.into_iter().collect(),
            FindResult::All(records) => records,
        }
    }

    /// 是否没有记录
    pub fn is_empty(&self) -> bool {
        match self {
            FindResult::First(record) => record.is_none(),
            FindResult::All(records) => records.is_empty(),
        }
    }
}

impl OrmManager {
    /// 按选项查询模型记录，`cascade` 为真时挂载关联记录
    pub async fn find(&self, model: &str, options: FindOptions) -> QuickOrmResult<FindResult> {
        let info = self.model(model).await?;
        let mut visited = HashSet::new();
        visited.insert(info.name().to_string());
        self.find_with_visited(info, options, visited).await
    }

    /// 查询全部匹配记录
    pub async fn find_all(&self, model: &str, options: FindOptions) -> QuickOrmResult<Vec<Record>> {
        let result = self.find(model, options.find_type(FindType::All)).await?;
        Ok(result.into_all())
    }

    /// 查询第一条匹配记录
    pub async fn find_first(&self, model: &str, options: FindOptions) -> QuickOrmResult<Option<Record>> {
        let result = self.find(model, options.find_type(FindType::First)).await?;
        Ok(result.into_first())
    }

    /// 按单个字段查询，字段条件覆盖选项中同名的条件
    ///
    /// 字段可以是 `primary_key`，不存在的字段返回 `FieldAccessError`
    pub async fn find_by<V: Into<DataValue>>(
        &self,
        model: &str,
        field: &str,
        value: V,
        options: FindOptions,
    ) -> QuickOrmResult<FindResult> {
        let info = self.model(model).await?;
        let field = Self::finder_field(&info, field)?;
        let mut options = options;
        options.set_condition(&field, value.into());
        let mut visited = HashSet::new();
        visited.insert(info.name().to_string());
        self.find_with_visited(info, options, visited).await
    }

    /// 按单个字段查询第一条
    pub async fn find_first_by<V: Into<DataValue>>(
        &self,
        model: &str,
        field: &str,
        value: V,
        options: FindOptions,
    ) -> QuickOrmResult<Option<Record>> {
        let result = self
            .find_by(model, field, value, options.find_type(FindType::First))
            .await?;
        Ok(result.into_first())
    }

    /// 按单个字段查询全部
    pub async fn find_all_by<V: Into<DataValue>>(
        &self,
        model: &str,
        field: &str,
        value: V,
        options: FindOptions,
    ) -> QuickOrmResult<Vec<Record>> {
        let result = self
            .find_by(model, field, value, options.find_type(FindType::All))
            .await?;
        Ok(result.into_all())
    }

    fn finder_field(info: &ModelInfo, field: &str) -> QuickOrmResult<String> {
        if field == PRIMARY_KEY_ALIAS {
            if let Some(primary_key) = info.primary_key() {
                return Ok(primary_key.to_string());
            }
        }
        if info.schema().has_field(field) {
            Ok(field.to_string())
        } else {
            Err(crate::orm_error!(field, info.name(), field))
        }
    }

    /// 带已访问模型集合的查询，级联查询递归经过这里
    pub(crate) fn find_with_visited(
        &self,
        info: Arc<ModelInfo>,
        options: FindOptions,
        visited: HashSet<String>,
    ) -> BoxFuture<'_, QuickOrmResult<FindResult>> {
        async move {
            let sql = ConditionCompiler::new(self.database()).select(
                info.table_name(),
                info.short_name(),
                &options,
            )?;
            let rows = self.database().query(&sql).await?.into_rows();
            debug!("查询 {} 得到 {} 行", info.name(), rows.len());

            let mut records: Vec<Record> = match options.find_type {
                FindType::First => rows
                    .into_iter()
                    .take(1)
                    .map(|row| Record::hydrate(info.clone(), row))
                    .collect(),
                FindType::All => rows
                    .into_iter()
                    .map(|row| Record::hydrate(info.clone(), row))
                    .collect(),
            };

            if options.cascade && !info.relations().is_empty() {
                self.attach_related(&mut records, &visited).await?;
            }

            Ok(match options.find_type {
                FindType::First => FindResult::First(records.into_iter().next()),
                FindType::All => FindResult::All(records),
            })
        }
        .boxed()
    }
}
