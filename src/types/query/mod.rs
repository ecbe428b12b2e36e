use crate::types::data_value::DataValue;
use serde::{Deserialize, Serialize};

/// 查询条件
///
/// 按字段匹配的条件，其值可以带操作符前缀（例如 `"!= Bob"`、`"in 1,2,3"`）；
/// 或者一段原样拼接的谓词文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// 字段条件
    Field {
        /// 字段名
        field: String,
        /// 值（可带操作符前缀）
        value: DataValue,
    },
    /// 原样谓词
    Raw(String),
}

/// 逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogicalOperator {
    /// AND 逻辑
    #[default]
    And,
    /// OR 逻辑
    Or,
}

impl LogicalOperator {
    /// 语句中的关键字
    pub fn keyword(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOperator {
    /// 等于
    Eq,
    /// 不等于
    Ne,
    /// 大于
    Gt,
    /// 大于等于
    Gte,
    /// 小于
    Lt,
    /// 小于等于
    Lte,
    /// 模糊匹配
    Like,
    /// 在列表中
    In,
}

impl QueryOperator {
    /// 语句中的写法，`!=` 统一写作 `<>`
    pub fn sql(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "=",
            QueryOperator::Ne => "<>",
            QueryOperator::Gt => ">",
            QueryOperator::Gte => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
            QueryOperator::Like => "like",
            QueryOperator::In => "in",
        }
    }

    /// 从条件值中拆出操作符前缀
    ///
    /// 三字符前缀先于两字符前缀检查，没有前缀时按等于处理，返回剩余的操作数
    pub fn split_prefix(value: &str) -> (QueryOperator, &str) {
        const THREE: [(&str, QueryOperator); 5] = [
            ("<> ", QueryOperator::Ne),
            ("in ", QueryOperator::In),
            ("!= ", QueryOperator::Ne),
            ("<= ", QueryOperator::Lte),
            (">= ", QueryOperator::Gte),
        ];
        const TWO: [(&str, QueryOperator); 4] = [
            ("< ", QueryOperator::Lt),
            ("> ", QueryOperator::Gt),
            ("~ ", QueryOperator::Like),
            ("= ", QueryOperator::Eq),
        ];

        for (prefix, op) in THREE.iter().chain(TWO.iter()) {
            if let Some(rest) = value.strip_prefix(prefix) {
                return (*op, rest);
            }
        }
        (QueryOperator::Eq, value)
    }
}

/// 选择的字段
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum FieldSelection {
    /// 所有字段
    #[default]
    All,
    /// 指定字段列表
    Fields(Vec<String>),
}

/// 结果数量限制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Limit {
    /// 不限制
    #[default]
    None,
    /// 最多返回 n 行，0 等同于不限制
    Count(u64),
    /// 跳过 offset 行后最多返回 count 行
    Range { offset: u64, count: u64 },
}

impl Limit {
    /// 解析 `"n"` 或 `"offset,count"` 形式的限制
    pub fn parse(text: &str) -> Option<Limit> {
        let text = text.trim();
        if text.is_empty() {
            return Some(Limit::None);
        }
        match text.split_once(',') {
            Some((offset, count)) => Some(Limit::Range {
                offset: offset.trim().parse().ok()?,
                count: count.trim().parse().ok()?,
            }),
            None => text.parse().ok().map(Limit::Count),
        }
    }

    /// 语句中的限制子句内容，不限制时返回 None
    pub fn clause(&self) -> Option<String> {
        match self {
            Limit::None | Limit::Count(0) => None,
            Limit::Count(n) => Some(n.to_string()),
            Limit::Range { offset, count } => Some(format!("{}, {}", offset, count)),
        }
    }
}

/// 查询结果形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FindType {
    /// 只取第一条
    First,
    /// 全部
    #[default]
    All,
}

/// 查询选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    /// 有序的查询条件
    pub conditions: Vec<Condition>,
    /// 选择的字段
    pub fields: FieldSelection,
    /// 排序（`"field"` 或 `"field dir"`）
    pub order_by: Option<String>,
    /// 数量限制
    pub limit: Limit,
    /// 条件间的逻辑操作符
    pub operator: LogicalOperator,
    /// 结果形态
    pub find_type: FindType,
    /// 是否级联加载关联记录
    pub cascade: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            fields: FieldSelection::All,
            order_by: None,
            limit: Limit::None,
            operator: LogicalOperator::And,
            find_type: FindType::All,
            cascade: true,
        }
    }
}

impl FindOptions {
    /// 创建新的查询选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加字段条件，同名字段已存在时原位覆盖
    pub fn condition<V: Into<DataValue>>(mut self, field: &str, value: V) -> Self {
        self.set_condition(field, value.into());
        self
    }

    /// 追加原样谓词
    pub fn raw(mut self, predicate: &str) -> Self {
        self.conditions.push(Condition::Raw(predicate.to_string()));
        self
    }

    /// 设置字段选择
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = FieldSelection::Fields(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// 设置排序
    pub fn order_by(mut self, order_by: &str) -> Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    /// 设置数量限制
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Limit::Count(limit);
        self
    }

    /// 设置带偏移的数量限制
    pub fn limit_range(mut self, offset: u64, count: u64) -> Self {
        self.limit = Limit::Range { offset, count };
        self
    }

    /// 设置逻辑操作符
    pub fn operator(mut self, operator: LogicalOperator) -> Self {
        self.operator = operator;
        self
    }

    /// 设置结果形态
    pub fn find_type(mut self, find_type: FindType) -> Self {
        self.find_type = find_type;
        self
    }

    /// 设置是否级联
    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    /// 原位设置字段条件，不存在时追加到末尾
    pub fn set_condition(&mut self, field: &str, value: DataValue) {
        for condition in self.conditions.iter_mut() {
            if let Condition::Field { field: existing, value: slot } = condition {
                if existing == field {
                    *slot = value;
                    return;
                }
            }
        }
        self.conditions.push(Condition::Field {
            field: field.to_string(),
            value,
        });
    }

    /// 强制单条结果语义
    pub fn force_single(&mut self) {
        self.find_type = FindType::First;
        self.limit = Limit::Count(1);
    }
}

/// 保存选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// 是否级联保存关联记录
    pub cascade: bool,
    /// 保存前是否验证
    pub validate: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            cascade: false,
            validate: true,
        }
    }
}

impl SaveOptions {
    /// 创建默认保存选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置是否级联
    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    /// 设置是否验证
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_prefix() {
        assert_eq!(QueryOperator::split_prefix("!= Bob"), (QueryOperator::Ne, "Bob"));
        assert_eq!(QueryOperator::split_prefix("<= 4"), (QueryOperator::Lte, "4"));
        assert_eq!(QueryOperator::split_prefix("< 4"), (QueryOperator::Lt, "4"));
        assert_eq!(QueryOperator::split_prefix("in 1,2"), (QueryOperator::In, "1,2"));
        assert_eq!(QueryOperator::split_prefix("~ %ob%"), (QueryOperator::Like, "%ob%"));
        // 没有空格分隔时不是操作符
        assert_eq!(QueryOperator::split_prefix("<4"), (QueryOperator::Eq, "<4"));
        assert_eq!(QueryOperator::split_prefix("index"), (QueryOperator::Eq, "index"));
    }

    #[test]
    fn test_limit_parse() {
        assert_eq!(Limit::parse("5"), Some(Limit::Count(5)));
        assert_eq!(Limit::parse("1, 1"), Some(Limit::Range { offset: 1, count: 1 }));
        assert_eq!(Limit::parse(""), Some(Limit::None));
        assert_eq!(Limit::parse("x"), None);
        assert_eq!(Limit::Count(0).clause(), None);
        assert_eq!(Limit::Range { offset: 1, count: 1 }.clause().as_deref(), Some("1, 1"));
    }

    #[test]
    fn test_set_condition_keeps_position() {
        let mut options = FindOptions::new().condition("name", "Bob").condition("id", 2);
        options.set_condition("name", DataValue::from("Jim"));
        assert_eq!(
            options.conditions[0],
            Condition::Field { field: "name".to_string(), value: DataValue::from("Jim") }
        );
        assert_eq!(options.conditions.len(), 2);
    }
}
