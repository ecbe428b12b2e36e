//! 条件编译器
//!
//! 把 [`FindOptions`] 编译成查询语句，同时负责生成插入、更新、删除、
//! 表结构和计数语句。引擎中所有语句文本都在这里拼接，
//! 字面量一律经过执行器转义，标识符一律经过安全验证。

use crate::database::Database;
use crate::error::QuickOrmResult;
use crate::security::IdentifierValidator;
use crate::types::{Condition, DataValue, FieldSelection, FindOptions, QueryOperator};

/// 计数语句结果列名
pub const ROW_COUNT_LABEL: &str = "row_count";

/// 条件编译器
pub struct ConditionCompiler<'a> {
    db: &'a Database,
}

impl<'a> ConditionCompiler<'a> {
    /// 使用数据库门面的转义规则创建编译器
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// 带引号的字符串字面量
    pub fn quote(&self, value: &str) -> String {
        format!("'{}'", self.db.escape(value))
    }

    /// 值字面量，空值写作 NULL
    pub fn literal(&self, value: &DataValue) -> String {
        match value {
            DataValue::Null => "NULL".to_string(),
            other => self.quote(&other.to_plain_string()),
        }
    }

    /// 编译单个字段条件：`` `Alias`.`field` OP value ``
    pub fn field_condition(&self, alias: &str, field: &str, value: &DataValue) -> QuickOrmResult<String> {
        let column = format!(
            "{}.{}",
            IdentifierValidator::safe_table(alias)?,
            IdentifierValidator::safe_field(field)?
        );
        let text = value.to_plain_string();
        let (operator, operand) = QueryOperator::split_prefix(&text);
        let rendered = match operator {
            QueryOperator::In => {
                let escaped = self.db.escape(operand);
                format!("('{}')", escaped.split(',').collect::<Vec<_>>().join("', '"))
            }
            _ => self.quote(operand),
        };
        Ok(format!("{} {} {}", column, operator.sql(), rendered))
    }

    /// 编译 where 子句内容，没有条件时为恒真的 `1`
    pub fn predicate(&self, alias: &str, options: &FindOptions) -> QuickOrmResult<String> {
        let mut fragments = Vec::with_capacity(options.conditions.len());
        for condition in &options.conditions {
            match condition {
                Condition::Field { field, value } => {
                    fragments.push(self.field_condition(alias, field, value)?)
                }
                Condition::Raw(predicate) => fragments.push(predicate.clone()),
            }
        }
        if fragments.is_empty() {
            return Ok("1".to_string());
        }
        let glue = format!(" {} ", options.operator.keyword());
        Ok(fragments.join(&glue))
    }

    /// 编译查询语句
    ///
    /// 形如 `` select * from `users` as `User` where 1 order by `User`.`id` desc limit 1 ``
    pub fn select(&self, table: &str, alias: &str, options: &FindOptions) -> QuickOrmResult<String> {
        let quoted_alias = IdentifierValidator::safe_table(alias)?;
        let fields = match &options.fields {
            FieldSelection::Fields(fields) if !fields.is_empty() => {
                let mut columns = Vec::with_capacity(fields.len());
                for field in fields {
                    columns.push(format!("{}.{}", quoted_alias, IdentifierValidator::safe_field(field)?));
                }
                columns.join(",")
            }
            _ => "*".to_string(),
        };

        let mut sql = format!(
            "select {} from {} as {} where {}",
            fields,
            IdentifierValidator::safe_table(table)?,
            quoted_alias,
            self.predicate(alias, options)?
        );

        if let Some(order_by) = options.order_by.as_deref().filter(|o| !o.trim().is_empty()) {
            let mut parts = order_by.split(' ');
            let field = parts.next().unwrap_or("");
            // 方向缺失或无法识别时退回升序
            let direction = match parts.next() {
                Some("desc") => "desc",
                _ => "asc",
            };
            sql.push_str(&format!(
                " order by {}.{} {}",
                quoted_alias,
                IdentifierValidator::safe_field(field)?,
                direction
            ));
        }

        if let Some(limit) = options.limit.clause() {
            sql.push_str(" limit ");
            sql.push_str(&limit);
        }

        Ok(sql)
    }

    /// 编译插入语句，空值字段不出现在语句中
    pub fn insert(&self, table: &str, values: &[(&str, &DataValue)]) -> QuickOrmResult<String> {
        let mut fields = Vec::new();
        let mut literals = Vec::new();
        for (field, value) in values {
            if value.is_null() {
                continue;
            }
            fields.push(IdentifierValidator::safe_field(field)?);
            literals.push(self.quote(&value.to_plain_string()));
        }
        Ok(format!(
            "insert into {} ({}) values ({})",
            IdentifierValidator::safe_table(table)?,
            fields.join(", "),
            literals.join(", ")
        ))
    }

    /// 编译按主键更新的语句，最多影响一行
    ///
    /// 除主键外没有可写字段时返回 `None`
    pub fn update(
        &self,
        table: &str,
        primary_key: &str,
        key_value: &DataValue,
        values: &[(&str, &DataValue)],
    ) -> QuickOrmResult<Option<String>> {
        let mut updates = Vec::with_capacity(values.len());
        for (field, value) in values {
            if *field == primary_key {
                continue;
            }
            updates.push(format!(
                "{} = {}",
                IdentifierValidator::safe_field(field)?,
                self.literal(value)
            ));
        }
        if updates.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!(
            "update {} set {} where {} = {} limit 1",
            IdentifierValidator::safe_table(table)?,
            updates.join(", "),
            IdentifierValidator::safe_field(primary_key)?,
            self.quote(&key_value.to_plain_string())
        )))
    }

    /// 编译按主键删除的语句，最多影响一行
    pub fn delete(&self, table: &str, primary_key: &str, key_value: &DataValue) -> QuickOrmResult<String> {
        Ok(format!(
            "delete from {} where {} = {} limit 1",
            IdentifierValidator::safe_table(table)?,
            IdentifierValidator::safe_field(primary_key)?,
            self.quote(&key_value.to_plain_string())
        ))
    }

    /// 表结构语句
    pub fn describe(table: &str) -> QuickOrmResult<String> {
        Ok(format!("describe {}", IdentifierValidator::safe_table(table)?))
    }

    /// 行数语句，结果列为 [`ROW_COUNT_LABEL`]
    pub fn count(table: &str) -> QuickOrmResult<String> {
        Ok(format!(
            "select count(*) as `{}` from {}",
            ROW_COUNT_LABEL,
            IdentifierValidator::safe_table(table)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MemoryExecutor;
    use crate::types::LogicalOperator;
    use std::sync::Arc;

    fn database() -> Database {
        Database::new(Arc::new(MemoryExecutor::new()))
    }

    #[test]
    fn test_operator_conditions() {
        let db = database();
        let compiler = ConditionCompiler::new(&db);

        assert_eq!(
            compiler.field_condition("User", "name", &DataValue::from("!= Bob")).unwrap(),
            "`User`.`name` <> 'Bob'"
        );
        assert_eq!(
            compiler.field_condition("User", "id", &DataValue::from("in 1,2,3")).unwrap(),
            "`User`.`id` in ('1', '2', '3')"
        );
        assert_eq!(
            compiler.field_condition("User", "name", &DataValue::from("Bob")).unwrap(),
            "`User`.`name` = 'Bob'"
        );
        assert_eq!(
            compiler.field_condition("User", "name", &DataValue::from("~ %o%")).unwrap(),
            "`User`.`name` like '%o%'"
        );
        assert_eq!(
            compiler.field_condition("User", "id", &DataValue::from(">= 2")).unwrap(),
            "`User`.`id` >= '2'"
        );
        assert_eq!(
            compiler.field_condition("User", "id", &DataValue::Int(2)).unwrap(),
            "`User`.`id` = '2'"
        );
    }

    #[test]
    fn test_literals_are_escaped() {
        let db = database();
        let compiler = ConditionCompiler::new(&db);
        assert_eq!(
            compiler.field_condition("User", "name", &DataValue::from("O'Brien")).unwrap(),
            "`User`.`name` = 'O\\'Brien'"
        );
        assert_eq!(
            compiler.field_condition("User", "name", &DataValue::from("in a'b,c")).unwrap(),
            "`User`.`name` in ('a\\'b', 'c')"
        );
    }

    #[test]
    fn test_select_shape() {
        let db = database();
        let compiler = ConditionCompiler::new(&db);

        let sql = compiler.select("users", "User", &FindOptions::new()).unwrap();
        assert_eq!(sql, "select * from `users` as `User` where 1");

        let options = FindOptions::new()
            .condition("name", "Bob")
            .condition("id", 2)
            .operator(LogicalOperator::Or)
            .fields(&["id", "name"])
            .order_by("id desc")
            .limit(1);
        let sql = compiler.select("users", "User", &options).unwrap();
        assert_eq!(
            sql,
            "select `User`.`id`,`User`.`name` from `users` as `User` where `User`.`name` = 'Bob' or `User`.`id` = '2' order by `User`.`id` desc limit 1"
        );
    }

    #[test]
    fn test_order_direction_falls_back_to_asc() {
        let db = database();
        let compiler = ConditionCompiler::new(&db);
        let sql = compiler
            .select("users", "User", &FindOptions::new().order_by("name sideways").limit_range(1, 1))
            .unwrap();
        assert_eq!(sql, "select * from `users` as `User` where 1 order by `User`.`name` asc limit 1, 1");
    }

    #[test]
    fn test_raw_conditions_pass_through() {
        let db = database();
        let compiler = ConditionCompiler::new(&db);
        let options = FindOptions::new().raw("`User`.`id` > 1").condition("name", "Jim");
        assert_eq!(
            compiler.predicate("User", &options).unwrap(),
            "`User`.`id` > 1 and `User`.`name` = 'Jim'"
        );
    }

    #[test]
    fn test_mutation_statements() {
        let db = database();
        let compiler = ConditionCompiler::new(&db);
        let name = DataValue::from("Bob");
        let missing = DataValue::Null;
        let id = DataValue::Int(2);

        assert_eq!(
            compiler.insert("users", &[("id", &missing), ("name", &name)]).unwrap(),
            "insert into `users` (`name`) values ('Bob')"
        );
        assert_eq!(
            compiler
                .update("users", "id", &id, &[("id", &id), ("name", &name), ("password", &missing)])
                .unwrap()
                .as_deref(),
            Some("update `users` set `name` = 'Bob', `password` = NULL where `id` = '2' limit 1")
        );
        assert_eq!(compiler.update("tags", "id", &id, &[("id", &id)]).unwrap(), None);
        assert_eq!(
            compiler.insert("tags", &[("id", &missing)]).unwrap(),
            "insert into `tags` () values ()"
        );
        assert_eq!(
            compiler.delete("users", "id", &id).unwrap(),
            "delete from `users` where `id` = '2' limit 1"
        );
        assert_eq!(ConditionCompiler::describe("users").unwrap(), "describe `users`");
        assert_eq!(
            ConditionCompiler::count("users").unwrap(),
            "select count(*) as `row_count` from `users`"
        );
    }

    #[test]
    fn test_unsafe_identifiers_rejected() {
        let db = database();
        let compiler = ConditionCompiler::new(&db);
        assert!(compiler.field_condition("User", "id` or 1 --", &DataValue::Int(1)).is_err());
        assert!(compiler.select("users", "User", &FindOptions::new().order_by("id;")).is_err());
    }
}
