use serde::{Deserialize, Serialize};

/// 通用数据值类型 - 记录字段与查询条件共用的标量表示
///
/// 序列化为无标签的JSON标量，`Null` 对应 `null`
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// 空值
    Null,
    /// 布尔值
    Bool(bool),
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
}

impl Default for DataValue {
    fn default() -> Self {
        DataValue::Null
    }
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl std::fmt::Debug for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl DataValue {
    /// 获取数据类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Int(_) => "integer",
            DataValue::Float(_) => "float",
            DataValue::String(_) => "string",
        }
    }

    /// 判断是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// 宽松的“空”判断：空值、false、0、0.0、空串和 "0" 都视为空
    pub fn is_empty(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::Bool(b) => !*b,
            DataValue::Int(i) => *i == 0,
            DataValue::Float(f) => *f == 0.0,
            DataValue::String(s) => s.is_empty() || s == "0",
        }
    }

    /// 字符串形式，用于语句拼接和长度类验证
    ///
    /// 空值为空串，true 为 "1"，false 为空串
    pub fn to_plain_string(&self) -> String {
        match self {
            DataValue::Null => String::new(),
            DataValue::Bool(true) => "1".to_string(),
            DataValue::Bool(false) => String::new(),
            DataValue::Int(i) => i.to_string(),
            DataValue::Float(f) => f.to_string(),
            DataValue::String(s) => s.clone(),
        }
    }

    /// 尝试解释为整数
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            DataValue::Bool(b) => Some(*b as i64),
            DataValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            DataValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// 尝试解释为浮点数
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Int(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            DataValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// 获取字符串引用
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 转换为 JSON 值
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DataValue::Null => serde_json::Value::Null,
            DataValue::Bool(b) => serde_json::Value::Bool(*b),
            DataValue::Int(i) => serde_json::Value::Number(serde_json::Number::from(*i)),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DataValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// 列的值类别，由列的 SQL 类型推断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// 整数类列
    Integer,
    /// 浮点/定点类列
    Float,
    /// 其余列按文本处理
    Text,
}

impl ColumnKind {
    /// 从 `describe` 输出的类型文本推断，例如 `int(11)`、`varchar(64)`
    pub fn from_sql_type(sql_type: &str) -> Self {
        let lower = sql_type.trim().to_ascii_lowercase();
        let base = lower.split(|c: char| c == '(' || c == ' ').next().unwrap_or("");
        match base {
            "int" | "integer" | "tinyint" | "smallint" | "mediumint" | "bigint" => ColumnKind::Integer,
            "float" | "double" | "decimal" | "numeric" | "real" => ColumnKind::Float,
            _ => ColumnKind::Text,
        }
    }

    /// 把值转换成该列类别的表示，无法无损转换时返回 None
    ///
    /// 空值原样保留
    pub fn coerce(&self, value: &DataValue) -> Option<DataValue> {
        match (self, value) {
            (_, DataValue::Null) => Some(DataValue::Null),
            (ColumnKind::Integer, DataValue::Int(i)) => Some(DataValue::Int(*i)),
            (ColumnKind::Integer, DataValue::Bool(b)) => Some(DataValue::Int(*b as i64)),
            (ColumnKind::Integer, DataValue::Float(f)) if f.fract() == 0.0 => Some(DataValue::Int(*f as i64)),
            (ColumnKind::Integer, DataValue::String(s)) => s.trim().parse().ok().map(DataValue::Int),
            (ColumnKind::Integer, _) => None,
            (ColumnKind::Float, DataValue::Bool(b)) => Some(DataValue::Float(*b as i64 as f64)),
            (ColumnKind::Float, other) => other.as_f64().map(DataValue::Float),
            (ColumnKind::Text, DataValue::String(s)) => Some(DataValue::String(s.clone())),
            (ColumnKind::Text, DataValue::Bool(b)) => Some(DataValue::String(if *b { "1" } else { "0" }.to_string())),
            (ColumnKind::Text, other) => Some(DataValue::String(other.to_plain_string())),
        }
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&String> for DataValue {
    fn from(value: &String) -> Self {
        DataValue::String(value.clone())
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Int(value as i64)
    }
}

impl From<u32> for DataValue {
    fn from(value: u32) -> Self {
        DataValue::Int(value as i64)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DataValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_emptiness() {
        assert!(DataValue::Null.is_empty());
        assert!(DataValue::from("").is_empty());
        assert!(DataValue::from("0").is_empty());
        assert!(DataValue::Int(0).is_empty());
        assert!(DataValue::Bool(false).is_empty());
        assert!(!DataValue::from(" ").is_empty());
        assert!(!DataValue::Int(7).is_empty());
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(DataValue::Bool(true).to_plain_string(), "1");
        assert_eq!(DataValue::Null.to_plain_string(), "");
        assert_eq!(DataValue::Float(2.5).to_plain_string(), "2.5");
        assert_eq!(DataValue::from(Some(3)).to_plain_string(), "3");
    }

    #[test]
    fn test_column_kind_coercion() {
        assert_eq!(ColumnKind::from_sql_type("int(11)"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_sql_type("BIGINT unsigned"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_sql_type("decimal(10,2)"), ColumnKind::Float);
        assert_eq!(ColumnKind::from_sql_type("varchar(64)"), ColumnKind::Text);

        assert_eq!(ColumnKind::Integer.coerce(&DataValue::from(" 12")), Some(DataValue::Int(12)));
        assert_eq!(ColumnKind::Integer.coerce(&DataValue::from("abc")), None);
        assert_eq!(ColumnKind::Integer.coerce(&DataValue::Null), Some(DataValue::Null));
        assert_eq!(ColumnKind::Text.coerce(&DataValue::Int(3)), Some(DataValue::from("3")));
        assert_eq!(ColumnKind::Float.coerce(&DataValue::from("1.5")), Some(DataValue::Float(1.5)));
    }

    #[test]
    fn test_untagged_json() {
        let json = serde_json::to_string(&vec![
            DataValue::Null,
            DataValue::Int(1),
            DataValue::from("Bob"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,1,"Bob"]"#);

        let back: Vec<DataValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[2], DataValue::from("Bob"));
        assert!(back[0].is_null());
    }
}
