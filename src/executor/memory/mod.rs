//! 内存执行器
//!
//! 在进程内解释引擎生成的 MySQL 语句子集，无需数据库服务即可运行完整的
//! 查询/保存/删除流程。支持 `describe`、带条件/排序/限制的 `select`、
//! `count`、`insert`、`update`、`delete` 和 `truncate`。
//!
//! 字符串比较与 MySQL 默认排序规则一致，不区分大小写。

mod lexer;
mod parser;

use crate::config::{ConnectionOptions, DriverKind};
use crate::error::QuickOrmResult;
use crate::executor::{DriverError, QueryOutput, RowMap, SqlExecutor};
use crate::types::{ColumnKind, DataValue};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use parser::{ColumnRef, CompareOp, Expr, Literal, Operand, Projection, Select, Statement};
use rat_logger::{debug, info};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// 内存表的列定义
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// 列名
    pub name: String,
    /// SQL 类型文本，例如 `int(11)`
    pub sql_type: String,
    /// 是否允许空值
    pub nullable: bool,
    /// 是否为主键
    pub primary_key: bool,
    /// 是否自增
    pub auto_increment: bool,
    /// 默认值
    pub default: Option<DataValue>,
}

impl ColumnSpec {
    /// 创建可空、无默认值的普通列
    pub fn new(name: &str, sql_type: &str) -> Self {
        Self {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            nullable: true,
            primary_key: false,
            auto_increment: false,
            default: None,
        }
    }

    /// 标记为主键（同时不可为空）
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// 标记为自增
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// 标记为不可为空
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// 设置默认值
    pub fn default_value<V: Into<DataValue>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    fn kind(&self) -> ColumnKind {
        ColumnKind::from_sql_type(&self.sql_type)
    }
}

#[derive(Debug, Clone)]
struct MemoryTable {
    columns: Vec<ColumnSpec>,
    rows: Vec<RowMap>,
    next_id: i64,
}

impl MemoryTable {
    fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn auto_increment_column(&self) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.auto_increment)
    }
}

/// 内存执行器
///
/// 表结构通过 [`MemoryExecutor::create_table`] 声明，数据只存在于进程内
pub struct MemoryExecutor {
    tables: RwLock<HashMap<String, MemoryTable>>,
    connected: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl Default for MemoryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryExecutor {
    /// 创建空的内存执行器
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            connected: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// 创建（或替换）一张表
    pub fn create_table(&self, name: &str, columns: Vec<ColumnSpec>) {
        info!("内存执行器创建表: {} ({} 列)", name, columns.len());
        self.tables.write().insert(
            name.to_string(),
            MemoryTable {
                columns,
                rows: Vec::new(),
                next_id: 1,
            },
        );
    }

    /// 删除一张表
    pub fn drop_table(&self, name: &str) -> bool {
        self.tables.write().remove(name).is_some()
    }

    /// 表中当前的所有行
    pub fn rows(&self, table: &str) -> Option<Vec<RowMap>> {
        self.tables.read().get(table).map(|t| t.rows.clone())
    }

    /// 所有表名
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn execute(&self, sql: &str) -> Result<QueryOutput, DriverError> {
        match parser::parse(sql)? {
            Statement::Describe { table } => self.describe(&table),
            Statement::Select(select) => self.select(&select),
            Statement::Insert {
                table,
                columns,
                values,
            } => self.insert(&table, &columns, &values),
            Statement::Update {
                table,
                assignments,
                filter,
                limit,
            } => self.update(&table, &assignments, filter.as_ref(), limit),
            Statement::Delete {
                table,
                filter,
                limit,
            } => self.delete(&table, filter.as_ref(), limit),
            Statement::Truncate { table } => {
                let mut tables = self.tables.write();
                let stored = tables.get_mut(&table).ok_or_else(|| missing_table(&table))?;
                let affected = stored.rows.len() as u64;
                stored.rows.clear();
                stored.next_id = 1;
                Ok(QueryOutput::mutation(affected, None))
            }
        }
    }

    fn describe(&self, table: &str) -> Result<QueryOutput, DriverError> {
        let tables = self.tables.read();
        let stored = tables.get(table).ok_or_else(|| missing_table(table))?;
        let rows = stored
            .columns
            .iter()
            .map(|column| {
                let mut row = RowMap::new();
                row.insert("Field".to_string(), DataValue::from(&column.name));
                row.insert("Type".to_string(), DataValue::from(&column.sql_type));
                row.insert(
                    "Null".to_string(),
                    DataValue::from(if column.nullable { "YES" } else { "NO" }),
                );
                row.insert(
                    "Key".to_string(),
                    DataValue::from(if column.primary_key { "PRI" } else { "" }),
                );
                row.insert(
                    "Default".to_string(),
                    column
                        .default
                        .as_ref()
                        .map(|d| DataValue::String(d.to_plain_string()))
                        .unwrap_or(DataValue::Null),
                );
                row.insert(
                    "Extra".to_string(),
                    DataValue::from(if column.auto_increment { "auto_increment" } else { "" }),
                );
                row
            })
            .collect();
        Ok(QueryOutput::rows(rows))
    }

    fn select(&self, select: &Select) -> Result<QueryOutput, DriverError> {
        let tables = self.tables.read();
        let stored = tables
            .get(&select.table)
            .ok_or_else(|| missing_table(&select.table))?;
        let scope = Scope {
            table: &select.table,
            alias: select.alias.as_deref(),
            stored,
        };

        let mut matched = Vec::new();
        for row in &stored.rows {
            let keep = match &select.filter {
                Some(filter) => scope.eval(filter, row, "where clause")?,
                None => true,
            };
            if keep {
                matched.push(row);
            }
        }

        if let Projection::Count { column, label } = &select.projection {
            let count = match column {
                Some(column) => {
                    let name = scope.resolve(column, "field list")?;
                    matched
                        .iter()
                        .filter(|row| !row.get(name).unwrap_or(&DataValue::Null).is_null())
                        .count()
                }
                None => matched.len(),
            };
            let mut row = RowMap::new();
            row.insert(label.clone(), DataValue::Int(count as i64));
            return Ok(QueryOutput::rows(vec![row]));
        }

        if !select.order_by.is_empty() {
            let mut keys = Vec::with_capacity(select.order_by.len());
            for item in &select.order_by {
                keys.push((scope.resolve(&item.column, "order clause")?, item.descending));
            }
            matched.sort_by(|a, b| {
                for (name, descending) in &keys {
                    let left = a.get(*name).unwrap_or(&DataValue::Null);
                    let right = b.get(*name).unwrap_or(&DataValue::Null);
                    let ordering = sort_order(left, right);
                    let ordering = if *descending { ordering.reverse() } else { ordering };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let (offset, count) = select.limit.unwrap_or((0, u64::MAX));
        let window = matched
            .into_iter()
            .skip(offset as usize)
            .take(count.min(usize::MAX as u64) as usize);

        let rows: Vec<RowMap> = match &select.projection {
            Projection::All => window.cloned().collect(),
            Projection::Columns(columns) => {
                let mut names = Vec::with_capacity(columns.len());
                for column in columns {
                    names.push(scope.resolve(column, "field list")?);
                }
                window
                    .map(|row| {
                        names
                            .iter()
                            .map(|name| {
                                (name.to_string(), row.get(*name).cloned().unwrap_or(DataValue::Null))
                            })
                            .collect::<RowMap>()
                    })
                    .collect()
            }
            Projection::Count { .. } => Vec::new(),
        };
        Ok(QueryOutput::rows(rows))
    }

    fn insert(
        &self,
        table: &str,
        columns: &[String],
        values: &[Literal],
    ) -> Result<QueryOutput, DriverError> {
        if columns.len() != values.len() {
            return Err(DriverError::new(
                "Column count doesn't match value count at row 1",
            ));
        }

        let mut tables = self.tables.write();
        let stored = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        let mut provided = HashMap::new();
        for (name, literal) in columns.iter().zip(values) {
            let spec = stored
                .column(name)
                .ok_or_else(|| unknown_column(name, "field list"))?;
            provided.insert(name.clone(), store_value(spec, literal_value(literal))?);
        }

        let mut row = RowMap::new();
        let mut generated = None;
        for spec in &stored.columns {
            let value = match provided.remove(&spec.name) {
                Some(DataValue::Null) | None if spec.auto_increment => {
                    let id = stored.next_id;
                    generated = Some(id);
                    DataValue::Int(id)
                }
                Some(value) => value,
                None => match &spec.default {
                    Some(default) => store_value(spec, default.clone())?,
                    None if spec.nullable => DataValue::Null,
                    None => {
                        return Err(DriverError::new(format!(
                            "Field '{}' doesn't have a default value",
                            spec.name
                        )));
                    }
                },
            };
            if value.is_null() && !spec.nullable {
                return Err(DriverError::new(format!(
                    "Column '{}' cannot be null",
                    spec.name
                )));
            }
            row.insert(spec.name.clone(), value);
        }

        for spec in stored.columns.iter().filter(|c| c.primary_key) {
            let value = &row[&spec.name];
            if stored
                .rows
                .iter()
                .any(|existing| existing.get(&spec.name) == Some(value))
            {
                return Err(DriverError::new(format!(
                    "Duplicate entry '{}' for key 'PRIMARY'",
                    value.to_plain_string()
                )));
            }
        }

        let insert_id = match stored.auto_increment_column().map(|c| c.name.clone()) {
            Some(name) => {
                let id = row[&name].as_i64().unwrap_or(0);
                stored.next_id = stored.next_id.max(id + 1);
                Some(generated.unwrap_or(id))
            }
            None => None,
        };

        stored.rows.push(row);
        Ok(QueryOutput::mutation(1, insert_id))
    }

    fn update(
        &self,
        table: &str,
        assignments: &[(String, Literal)],
        filter: Option<&Expr>,
        limit: Option<u64>,
    ) -> Result<QueryOutput, DriverError> {
        let mut tables = self.tables.write();
        let stored = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        let mut changes = Vec::with_capacity(assignments.len());
        for (name, literal) in assignments {
            let spec = stored
                .column(name)
                .ok_or_else(|| unknown_column(name, "field list"))?;
            let value = store_value(spec, literal_value(literal))?;
            if value.is_null() && !spec.nullable {
                return Err(DriverError::new(format!("Column '{}' cannot be null", name)));
            }
            changes.push((name.clone(), value));
        }

        let targets = matching_indexes(table, stored, filter, limit)?;
        let mut affected = 0;
        for index in targets {
            let row = &mut stored.rows[index];
            let mut changed = false;
            for (name, value) in &changes {
                if row.get(name) != Some(value) {
                    row.insert(name.clone(), value.clone());
                    changed = true;
                }
            }
            if changed {
                affected += 1;
            }
        }
        Ok(QueryOutput::mutation(affected, None))
    }

    fn delete(
        &self,
        table: &str,
        filter: Option<&Expr>,
        limit: Option<u64>,
    ) -> Result<QueryOutput, DriverError> {
        let mut tables = self.tables.write();
        let stored = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        let targets = matching_indexes(table, stored, filter, limit)?;
        let affected = targets.len() as u64;
        for index in targets.into_iter().rev() {
            stored.rows.remove(index);
        }
        Ok(QueryOutput::mutation(affected, None))
    }
}

#[async_trait]
impl SqlExecutor for MemoryExecutor {
    async fn connect(&self, options: &ConnectionOptions) -> QuickOrmResult<bool> {
        if options.driver != DriverKind::Memory {
            return Err(crate::orm_error!(
                connection,
                format!("内存执行器不能使用 {:?} 连接配置", options.driver)
            ));
        }
        self.connected.store(true, AtomicOrdering::SeqCst);
        info!("内存执行器已连接");
        Ok(true)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(AtomicOrdering::SeqCst)
    }

    async fn query(&self, sql: &str) -> Result<QueryOutput, DriverError> {
        if !self.is_connected() {
            let error = DriverError::new("MySQL server has gone away");
            *self.last_error.lock() = Some(error.message.clone());
            return Err(error);
        }

        let result = self.execute(sql);
        match &result {
            Ok(_) => *self.last_error.lock() = None,
            Err(e) => {
                debug!("内存执行器执行失败: {} ({})", sql, e);
                *self.last_error.lock() = Some(e.message.clone());
            }
        }
        result
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// 条件求值的作用域：表名、别名和表结构
struct Scope<'a> {
    table: &'a str,
    alias: Option<&'a str>,
    stored: &'a MemoryTable,
}

impl<'a> Scope<'a> {
    fn resolve<'c>(&self, column: &'c ColumnRef, clause: &str) -> Result<&'c str, DriverError> {
        if let Some(qualifier) = &column.qualifier {
            let known = qualifier == self.table || Some(qualifier.as_str()) == self.alias;
            if !known {
                return Err(unknown_column(&format!("{}.{}", qualifier, column.name), clause));
            }
        }
        if self.stored.column(&column.name).is_none() {
            return Err(unknown_column(&column.name, clause));
        }
        Ok(column.name.as_str())
    }

    fn operand(&self, operand: &Operand, row: &RowMap, clause: &str) -> Result<DataValue, DriverError> {
        match operand {
            Operand::Column(column) => {
                let name = self.resolve(column, clause)?;
                Ok(row.get(name).cloned().unwrap_or(DataValue::Null))
            }
            Operand::Literal(literal) => Ok(literal_value(literal)),
        }
    }

    fn eval(&self, expr: &Expr, row: &RowMap, clause: &str) -> Result<bool, DriverError> {
        Ok(match expr {
            Expr::And(left, right) => self.eval(left, row, clause)? && self.eval(right, row, clause)?,
            Expr::Or(left, right) => self.eval(left, row, clause)? || self.eval(right, row, clause)?,
            Expr::Not(inner) => !self.eval(inner, row, clause)?,
            Expr::Compare { left, op, right } => {
                let left = self.operand(left, row, clause)?;
                let right = self.operand(right, row, clause)?;
                compare(&left, *op, &right)
            }
            Expr::In {
                operand,
                list,
                negated,
            } => {
                let value = self.operand(operand, row, clause)?;
                if value.is_null() {
                    false
                } else {
                    let found = list.iter().any(|literal| {
                        compare(&value, CompareOp::Eq, &literal_value(literal))
                    });
                    found != *negated
                }
            }
            Expr::IsNull { operand, negated } => {
                self.operand(operand, row, clause)?.is_null() != *negated
            }
            Expr::Value(operand) => {
                let value = self.operand(operand, row, clause)?;
                value.as_f64().is_some_and(|n| n != 0.0)
            }
        })
    }
}

fn matching_indexes(
    table: &str,
    stored: &MemoryTable,
    filter: Option<&Expr>,
    limit: Option<u64>,
) -> Result<Vec<usize>, DriverError> {
    let scope = Scope {
        table,
        alias: None,
        stored,
    };
    let limit = limit.unwrap_or(u64::MAX);
    let mut indexes = Vec::new();
    for (index, row) in stored.rows.iter().enumerate() {
        if indexes.len() as u64 >= limit {
            break;
        }
        let keep = match filter {
            Some(filter) => scope.eval(filter, row, "where clause")?,
            None => true,
        };
        if keep {
            indexes.push(index);
        }
    }
    Ok(indexes)
}

fn literal_value(literal: &Literal) -> DataValue {
    match literal {
        Literal::Null => DataValue::Null,
        Literal::Str(s) => DataValue::String(s.clone()),
        Literal::Number(n) => n
            .parse::<i64>()
            .map(DataValue::Int)
            .or_else(|_| n.parse::<f64>().map(DataValue::Float))
            .unwrap_or_else(|_| DataValue::String(n.clone())),
    }
}

fn store_value(spec: &ColumnSpec, value: DataValue) -> Result<DataValue, DriverError> {
    spec.kind().coerce(&value).ok_or_else(|| {
        DriverError::new(format!(
            "Incorrect {} value: '{}' for column '{}'",
            match spec.kind() {
                ColumnKind::Integer => "integer",
                ColumnKind::Float => "decimal",
                ColumnKind::Text => "string",
            },
            value.to_plain_string(),
            spec.name
        ))
    })
}

/// 非空值之间的比较；数值与可解析为数值的字符串按数值比较，其余按不区分大小写的字符串比较
fn value_order(left: &DataValue, right: &DataValue) -> Option<Ordering> {
    if left.is_null() || right.is_null() {
        return None;
    }
    let numeric = !matches!(left, DataValue::String(_)) || !matches!(right, DataValue::String(_));
    if numeric {
        if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
            return a.partial_cmp(&b);
        }
    }
    Some(
        left.to_plain_string()
            .to_lowercase()
            .cmp(&right.to_plain_string().to_lowercase()),
    )
}

fn sort_order(left: &DataValue, right: &DataValue) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => value_order(left, right).unwrap_or(Ordering::Equal),
    }
}

fn compare(left: &DataValue, op: CompareOp, right: &DataValue) -> bool {
    match op {
        CompareOp::Like | CompareOp::NotLike => {
            if left.is_null() || right.is_null() {
                return false;
            }
            let matched = like_match(
                &left.to_plain_string().to_lowercase(),
                &right.to_plain_string().to_lowercase(),
            );
            matched == (op == CompareOp::Like)
        }
        _ => match value_order(left, right) {
            None => false,
            Some(ordering) => match op {
                CompareOp::Eq => ordering == Ordering::Equal,
                CompareOp::Ne => ordering != Ordering::Equal,
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Ge => ordering != Ordering::Less,
                CompareOp::Like | CompareOp::NotLike => false,
            },
        },
    }
}

/// LIKE 匹配：`%` 任意长度，`_` 单个字符，反斜杠转义通配符
fn like_match(text: &str, pattern: &str) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Piece {
        Any,
        One,
        Char(char),
    }

    let mut pieces = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => pieces.push(Piece::Any),
            '_' => pieces.push(Piece::One),
            '\\' => pieces.push(Piece::Char(chars.next().unwrap_or('\\'))),
            other => pieces.push(Piece::Char(other)),
        }
    }

    let text: Vec<char> = text.chars().collect();
    // matches[j] 表示 text 前缀是否与 pieces[..j] 匹配
    let mut matches = vec![false; pieces.len() + 1];
    matches[0] = true;
    for j in 1..=pieces.len() {
        matches[j] = matches[j - 1] && pieces[j - 1] == Piece::Any;
    }
    for ch in text {
        let mut next = vec![false; pieces.len() + 1];
        for j in 1..=pieces.len() {
            next[j] = match pieces[j - 1] {
                Piece::Any => next[j - 1] || matches[j],
                Piece::One => matches[j - 1],
                Piece::Char(p) => matches[j - 1] && p == ch,
            };
        }
        matches = next;
    }
    matches[pieces.len()]
}

fn missing_table(table: &str) -> DriverError {
    DriverError::new(format!("Table '{}' doesn't exist", table))
}

fn unknown_column(column: &str, clause: &str) -> DriverError {
    DriverError::new(format!("Unknown column '{}' in '{}'", column, clause))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn users() -> MemoryExecutor {
        let executor = MemoryExecutor::new();
        executor.create_table(
            "users",
            vec![
                ColumnSpec::new("id", "int(11)").primary_key().auto_increment(),
                ColumnSpec::new("name", "varchar(64)").not_null().default_value(""),
                ColumnSpec::new("joined", "int(11)").default_value(0),
            ],
        );
        let options = ConnectionOptions::builder()
            .driver(DriverKind::Memory)
            .build()
            .unwrap();
        executor.connect(&options).await.unwrap();
        executor
            .query("insert into `users` (`name`, `joined`) values ('Bob', '100')")
            .await
            .unwrap();
        executor
            .query("insert into `users` (`name`, `joined`) values ('Jim', '200')")
            .await
            .unwrap();
        executor
    }

    fn names(output: QueryOutput) -> Vec<String> {
        output
            .into_rows()
            .into_iter()
            .map(|row| row["name"].to_plain_string())
            .collect()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_coerces() {
        let executor = users().await;
        let output = executor
            .query("insert into `users` (`name`) values ('Ann')")
            .await
            .unwrap();
        assert_eq!(output.insert_id(), Some(3));
        assert_eq!(output.num_affected_rows(), Some(1));

        let rows = executor.rows("users").unwrap();
        assert_eq!(rows[0]["joined"], DataValue::Int(100));
        assert_eq!(rows[2]["joined"], DataValue::Int(0));
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_limits() {
        let executor = users().await;

        let output = executor
            .query("select * from `users` as `User` where 1 order by `User`.`id` desc limit 1")
            .await
            .unwrap();
        assert_eq!(names(output), vec!["Jim"]);

        let output = executor
            .query("select * from `users` as `User` where `User`.`name` = 'bob' and `User`.`id` = '2'")
            .await
            .unwrap();
        assert_eq!(output.num_result_rows(), Some(0));

        let output = executor
            .query("select * from `users` as `User` where `User`.`name` = 'Bob' or `User`.`id` = '2' order by `User`.`id` asc")
            .await
            .unwrap();
        assert_eq!(names(output), vec!["Bob", "Jim"]);

        let output = executor
            .query("select `User`.`id` from `users` as `User` where 1 limit 1, 1")
            .await
            .unwrap();
        let rows = output.into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0]["id"], DataValue::Int(2));
    }

    #[tokio::test]
    async fn test_operators() {
        let executor = users().await;
        let cases = [
            ("`User`.`id` <> '1'", vec!["Jim"]),
            ("`User`.`id` in ('1', '2')", vec!["Bob", "Jim"]),
            ("`User`.`name` like '%i%'", vec!["Jim"]),
            ("`User`.`joined` >= '150'", vec!["Jim"]),
            ("`User`.`joined` < '150'", vec!["Bob"]),
        ];
        for (predicate, expected) in cases {
            let sql = format!("select * from `users` as `User` where {}", predicate);
            let output = executor.query(&sql).await.unwrap();
            assert_eq!(names(output), expected, "{}", sql);
        }
    }

    #[tokio::test]
    async fn test_update_reports_changed_rows() {
        let executor = users().await;
        let output = executor
            .query("update `users` set `name` = 'Bob', `joined` = '100' where `id` = '1' limit 1")
            .await
            .unwrap();
        assert_eq!(output.num_affected_rows(), Some(0));

        let output = executor
            .query("update `users` set `name` = 'Robert' where `id` = '1' limit 1")
            .await
            .unwrap();
        assert_eq!(output.num_affected_rows(), Some(1));
        assert_eq!(executor.rows("users").unwrap()[0]["name"], DataValue::from("Robert"));
    }

    #[tokio::test]
    async fn test_delete_count_and_errors() {
        let executor = users().await;
        let output = executor
            .query("delete from `users` where `id` = '1' limit 1")
            .await
            .unwrap();
        assert_eq!(output.num_affected_rows(), Some(1));

        let mut output = executor
            .query("select count(*) as `row_count` from `users`")
            .await
            .unwrap();
        let row = output.result_set().unwrap().get_row().unwrap();
        assert_eq!(row["row_count"], DataValue::Int(1));

        assert!(executor.query("select * from `missing`").await.is_err());
        assert!(executor.last_error().unwrap().contains("doesn't exist"));
        assert!(executor
            .query("select * from `users` where `nope` = '1'")
            .await
            .is_err());
        assert!(executor
            .query("insert into `users` (`id`, `name`) values ('2', 'Dup')")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_describe() {
        let executor = users().await;
        let rows = executor.query("describe `users`").await.unwrap().into_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Field"], DataValue::from("id"));
        assert_eq!(rows[0]["Key"], DataValue::from("PRI"));
        assert_eq!(rows[2]["Default"], DataValue::from("0"));
        assert!(rows[1]["Key"].to_plain_string().is_empty());
    }

    #[tokio::test]
    async fn test_requires_connection() {
        let executor = MemoryExecutor::new();
        assert!(!executor.is_connected());
        assert!(executor.query("select * from `users`").await.is_err());
    }

    #[test]
    fn test_like_match() {
        assert!(like_match("bob", "b%"));
        assert!(like_match("bob", "_o_"));
        assert!(!like_match("bob", "_o"));
        assert!(like_match("50%", "50\\%"));
        assert!(!like_match("500", "50\\%"));
        assert!(like_match("", "%"));
    }
}
