//! 表结构定义

use crate::error::QuickOrmResult;
use crate::executor::RowMap;
use crate::types::{ColumnKind, DataValue};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// 列定义，对应 `describe` 输出的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDefinition {
    /// 列名
    pub name: String,
    /// 列的 SQL 类型文本
    pub sql_type: String,
    /// 是否允许为空
    pub nullable: bool,
    /// 键类型（`PRI`、`UNI`、`MUL` 或空）
    pub key: String,
    /// 默认值，已按列类别转换
    pub default: DataValue,
    /// 附加信息（例如 `auto_increment`）
    pub extra: String,
    /// 值类别
    pub kind: ColumnKind,
}

impl ColumnDefinition {
    /// 从 `describe` 的一行解析
    pub fn from_describe_row(row: &RowMap) -> Option<Self> {
        let text = |key: &str| row.get(key).map(DataValue::to_plain_string).unwrap_or_default();

        let name = text("Field");
        if name.is_empty() {
            return None;
        }
        let sql_type = text("Type");
        let kind = ColumnKind::from_sql_type(&sql_type);
        let default = match row.get("Default") {
            Some(value) if !value.is_null() => kind.coerce(value).unwrap_or_else(|| value.clone()),
            _ => DataValue::Null,
        };

        Some(Self {
            name,
            nullable: text("Null").eq_ignore_ascii_case("YES"),
            key: text("Key"),
            extra: text("Extra"),
            sql_type,
            default,
            kind,
        })
    }

    /// 是否为主键列
    pub fn is_primary(&self) -> bool {
        self.key == "PRI"
    }
}

/// 表结构
///
/// 加载后除行数外不再变化，行数以原子方式增减
#[derive(Debug)]
pub struct TableSchema {
    name: String,
    model: String,
    columns: Vec<ColumnDefinition>,
    primary_key: Option<String>,
    row_count: AtomicI64,
}

impl TableSchema {
    /// 由 `describe` 结果构建表结构
    ///
    /// 主键取第一个标记为 `PRI` 的列
    pub fn from_describe(table: &str, model: &str, rows: &[RowMap]) -> QuickOrmResult<Self> {
        let columns: Vec<ColumnDefinition> = rows
            .iter()
            .filter_map(ColumnDefinition::from_describe_row)
            .collect();
        if columns.is_empty() {
            return Err(crate::orm_error!(schema, table, "表结构为空"));
        }
        let primary_key = columns.iter().find(|c| c.is_primary()).map(|c| c.name.clone());

        Ok(Self {
            name: table.to_string(),
            model: model.to_string(),
            columns,
            primary_key,
            row_count: AtomicI64::new(0),
        })
    }

    /// 表名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 使用该表的模型名
    pub fn model(&self) -> &str {
        &self.model
    }

    /// 主键字段
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// 按表中顺序的字段名
    pub fn fields(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// 列定义
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// 查找列定义
    pub fn column(&self, field: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == field)
    }

    /// 是否包含该字段
    pub fn has_field(&self, field: &str) -> bool {
        self.column(field).is_some()
    }

    /// 按列类别转换值，无法转换或未知字段时原样返回
    pub fn coerce(&self, field: &str, value: DataValue) -> DataValue {
        match self.column(field) {
            Some(column) => column.kind.coerce(&value).unwrap_or(value),
            None => value,
        }
    }

    /// 默认记录：除主键外每个字段的默认值
    pub fn default_record(&self) -> HashMap<String, DataValue> {
        self.columns
            .iter()
            .filter(|c| Some(c.name.as_str()) != self.primary_key())
            .map(|c| (c.name.clone(), c.default.clone()))
            .collect()
    }

    /// 缓存的行数
    pub fn row_count(&self) -> i64 {
        self.row_count.load(Ordering::SeqCst)
    }

    pub(crate) fn set_row_count(&self, count: i64) {
        self.row_count.store(count, Ordering::SeqCst);
    }

    /// 行数加一
    pub fn increment_row_count(&self) -> i64 {
        self.row_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 行数减一，不会小于零
    pub fn decrement_row_count(&self) -> i64 {
        let previous = self
            .row_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some((n - 1).max(0)))
            .unwrap_or(0);
        (previous - 1).max(0)
    }
}
