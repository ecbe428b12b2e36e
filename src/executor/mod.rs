//! 语句执行器模块
//!
//! 定义引擎与底层驱动之间的契约：连接、执行语句、转义字面量。
//! 引擎生成的所有语句都是 MySQL 风格的文本，执行器只负责执行并返回行。

use crate::config::ConnectionOptions;
use crate::error::QuickOrmResult;
use crate::types::DataValue;
use async_trait::async_trait;
use std::collections::HashMap;

pub mod memory;
#[cfg(feature = "mysql-support")]
pub mod mysql;

pub use memory::{ColumnSpec, MemoryExecutor};
#[cfg(feature = "mysql-support")]
pub use mysql::MysqlExecutor;

/// 单行结果：列名 -> 值
pub type RowMap = HashMap<String, DataValue>;

/// 驱动层错误
///
/// 由 `Database` 门面包装成带语句文本的 `QueryError`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    /// 驱动给出的错误描述
    pub message: String,
}

impl DriverError {
    /// 创建驱动错误
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 带游标的结果集
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: Vec<RowMap>,
    cursor: usize,
}

impl ResultSet {
    /// 用查询到的行创建结果集
    pub fn new(rows: Vec<RowMap>) -> Self {
        Self { rows, cursor: 0 }
    }

    /// 取出游标处的行并前移游标，读完后返回 None
    pub fn get_row(&mut self) -> Option<RowMap> {
        let row = self.rows.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        row
    }

    /// 从游标处读取剩余的所有行
    pub fn get_all(&mut self) -> Vec<RowMap> {
        let rest = self.rows[self.cursor.min(self.rows.len())..].to_vec();
        self.cursor = self.rows.len();
        rest
    }

    /// 把游标重置到第一行
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否没有行
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 消费结果集，返回全部行
    pub fn into_rows(self) -> Vec<RowMap> {
        self.rows
    }
}

/// 一次语句执行的输出
///
/// 读语句携带结果集；写语句携带影响行数和插入ID。不适用的计数为 None
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    result: Option<ResultSet>,
    insert_id: Option<i64>,
    num_affected_rows: Option<u64>,
}

impl QueryOutput {
    /// 读语句的输出
    pub fn rows(rows: Vec<RowMap>) -> Self {
        Self {
            result: Some(ResultSet::new(rows)),
            insert_id: None,
            num_affected_rows: None,
        }
    }

    /// 写语句的输出
    pub fn mutation(affected: u64, insert_id: Option<i64>) -> Self {
        Self {
            result: None,
            insert_id,
            num_affected_rows: Some(affected),
        }
    }

    /// 结果集（写语句没有结果集）
    pub fn result_set(&mut self) -> Option<&mut ResultSet> {
        self.result.as_mut()
    }

    /// 取出结果集中的全部行，写语句返回空列表
    pub fn into_rows(self) -> Vec<RowMap> {
        self.result.map(ResultSet::into_rows).unwrap_or_default()
    }

    /// 最近一次插入生成的ID，没有时为 None
    pub fn insert_id(&self) -> Option<i64> {
        self.insert_id.filter(|id| *id != 0)
    }

    /// 结果行数（仅读语句）
    pub fn num_result_rows(&self) -> Option<u64> {
        self.result.as_ref().map(|r| r.len() as u64)
    }

    /// 影响行数（仅写语句）
    pub fn num_affected_rows(&self) -> Option<u64> {
        self.num_affected_rows
    }
}

/// 语句执行器 trait
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// 建立连接
    async fn connect(&self, options: &ConnectionOptions) -> QuickOrmResult<bool>;

    /// 是否已连接
    fn is_connected(&self) -> bool;

    /// 执行一条语句
    async fn query(&self, sql: &str) -> Result<QueryOutput, DriverError>;

    /// 转义字符串字面量，结果可直接放进单引号中
    fn escape(&self, value: &str) -> String {
        escape_mysql(value)
    }

    /// 最近一次执行失败的错误描述
    fn last_error(&self) -> Option<String>;

    /// 执行器名称，用于日志
    fn name(&self) -> &'static str;
}

/// 按 MySQL 规则转义字符串字面量
pub fn escape_mysql(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\x1a' => escaped.push_str("\\Z"),
            other => escaped.push(other),
        }
    }
    escaped
}
