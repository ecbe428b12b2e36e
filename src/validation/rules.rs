//! 验证规则声明与编译
//!
//! 模型上声明的是 [`RuleDeclaration`]；规范化时编译成 [`Rule`]，
//! 正则、日期格式和回调都在这一步解析，声明有误时报配置错误

use crate::error::QuickOrmResult;
use crate::i18n::tf;
use crate::types::DataValue;
use crate::validation::dates::{DateFormat, parse_date};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 验证回调：接收字段值和附加参数，返回是否通过
pub type ValidationCallback = Arc<dyn Fn(&DataValue, &[DataValue]) -> bool + Send + Sync>;

/// 规则声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleDeclaration {
    /// 非空
    Required,
    /// 表中没有相同值
    Unique,
    /// 可解析为日期
    Date,
    /// 可解析为数字
    Numeric,
    /// 最小长度
    MinLength(usize),
    /// 最大长度
    MaxLength(usize),
    /// 精确长度
    Length(usize),
    /// 日期格式，PHP `date()` 字母或含 `%` 的 strftime 格式
    DateFormat(String),
    /// 正则，可写成 `/pattern/flags` 或 `|pattern|flags`
    Regex(String),
    /// 按名称引用已注册的回调
    Callback {
        /// 回调名
        name: String,
        /// 附加参数
        args: Vec<DataValue>,
    },
}

impl RuleDeclaration {
    /// 引用回调，不带附加参数
    pub fn callback(name: &str) -> Self {
        RuleDeclaration::Callback {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    /// 引用回调并附带参数
    pub fn callback_with(name: &str, args: Vec<DataValue>) -> Self {
        RuleDeclaration::Callback {
            name: name.to_string(),
            args,
        }
    }

    /// 规则名，也是错误表中的键
    pub fn name(&self) -> &'static str {
        match self {
            RuleDeclaration::Required => "required",
            RuleDeclaration::Unique => "unique",
            RuleDeclaration::Date => "date",
            RuleDeclaration::Numeric => "numeric",
            RuleDeclaration::MinLength(_) => "minlength",
            RuleDeclaration::MaxLength(_) => "maxlength",
            RuleDeclaration::Length(_) => "length",
            RuleDeclaration::DateFormat(_) => "dateformat",
            RuleDeclaration::Regex(_) => "regex",
            RuleDeclaration::Callback { .. } => "callback",
        }
    }

    /// 规则参数，验证失败时作为错误表中的值
    ///
    /// 无参数的规则以自身名称为参数
    pub fn argument(&self) -> DataValue {
        match self {
            RuleDeclaration::MinLength(n)
            | RuleDeclaration::MaxLength(n)
            | RuleDeclaration::Length(n) => DataValue::Int(*n as i64),
            RuleDeclaration::DateFormat(format) => DataValue::from(format),
            RuleDeclaration::Regex(pattern) => DataValue::from(pattern),
            RuleDeclaration::Callback { name, .. } => DataValue::from(name),
            other => DataValue::from(other.name()),
        }
    }
}

/// 单值检查的结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleVerdict {
    /// 通过
    Pass,
    /// 未通过
    Fail,
    /// 需要查表判断（唯一性）
    NeedsLookup,
}

impl From<bool> for RuleVerdict {
    fn from(pass: bool) -> Self {
        if pass { RuleVerdict::Pass } else { RuleVerdict::Fail }
    }
}

enum RuleCheck {
    Plain,
    Pattern(Regex),
    Format(DateFormat),
    Callback(ValidationCallback),
}

/// 编译后的规则
pub struct Rule {
    declaration: RuleDeclaration,
    check: RuleCheck,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("declaration", &self.declaration).finish()
    }
}

impl Rule {
    /// 编译规则声明
    ///
    /// # 参数
    ///
    /// * `field` - 规则所在字段，用于错误信息
    /// * `declaration` - 规则声明
    /// * `resolve_callback` - 按名称查找已注册的回调
    pub fn compile<F>(field: &str, declaration: RuleDeclaration, resolve_callback: F) -> QuickOrmResult<Self>
    where
        F: Fn(&str) -> Option<ValidationCallback>,
    {
        let check = match &declaration {
            RuleDeclaration::Regex(pattern) => RuleCheck::Pattern(
                compile_pattern(pattern).map_err(|message| invalid_rule(field, message))?,
            ),
            RuleDeclaration::DateFormat(format) => RuleCheck::Format(
                DateFormat::parse(format).map_err(|message| invalid_rule(field, message))?,
            ),
            RuleDeclaration::Callback { name, .. } => {
                let callback = resolve_callback(name).ok_or_else(|| {
                    crate::orm_error!(config, tf("error.unknown_callback", &[("name", name.as_str())]))
                })?;
                RuleCheck::Callback(callback)
            }
            _ => RuleCheck::Plain,
        };
        Ok(Self { declaration, check })
    }

    /// 规则声明
    pub fn declaration(&self) -> &RuleDeclaration {
        &self.declaration
    }

    /// 规则名
    pub fn name(&self) -> &'static str {
        self.declaration.name()
    }

    /// 检查一个非空值
    pub fn check(&self, value: &DataValue) -> RuleVerdict {
        let text = value.to_plain_string();
        match (&self.declaration, &self.check) {
            (RuleDeclaration::Required, _) => (!value.is_empty()).into(),
            (RuleDeclaration::Unique, _) => RuleVerdict::NeedsLookup,
            (RuleDeclaration::Date, _) => parse_date(&text).is_some().into(),
            (RuleDeclaration::Numeric, _) => is_numeric(value).into(),
            (RuleDeclaration::MinLength(n), _) => (text.len() >= *n).into(),
            (RuleDeclaration::MaxLength(n), _) => (text.len() <= *n).into(),
            (RuleDeclaration::Length(n), _) => (text.len() == *n).into(),
            (_, RuleCheck::Pattern(regex)) => regex.is_match(&text).into(),
            (_, RuleCheck::Format(format)) => parse_date(&text)
                .and_then(|date| format.format(&date))
                .is_some_and(|formatted| formatted == text)
                .into(),
            (RuleDeclaration::Callback { args, .. }, RuleCheck::Callback(callback)) => {
                callback(value, args).into()
            }
            _ => RuleVerdict::Fail,
        }
    }
}

fn invalid_rule(field: &str, message: String) -> crate::error::QuickOrmError {
    crate::orm_error!(
        config,
        tf("error.unknown_rule", &[("field", field), ("message", message.as_str())])
    )
}

fn is_numeric(value: &DataValue) -> bool {
    match value {
        DataValue::Int(_) | DataValue::Float(_) => true,
        DataValue::String(s) => s.trim().parse::<f64>().is_ok_and(|n| n.is_finite()),
        _ => false,
    }
}

/// 编译正则，支持带分隔符和修饰符的写法
fn compile_pattern(pattern: &str) -> Result<Regex, String> {
    let (body, flags) = split_delimited(pattern).unwrap_or((pattern, ""));
    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' | 'x' => inline.push(flag),
            other => return Err(format!("不支持的正则修饰符 '{}'", other)),
        }
    }
    let source = if inline.is_empty() {
        body.to_string()
    } else {
        format!("(?{}){}", inline, body)
    };
    Regex::new(&source).map_err(|e| e.to_string())
}

/// 拆出 `/body/flags` 形式中的 body 与 flags
fn split_delimited(pattern: &str) -> Option<(&str, &str)> {
    let delimiter = pattern.chars().next()?;
    if !matches!(delimiter, '/' | '|' | '#' | '~' | '!' | '@' | '%') {
        return None;
    }
    let end = pattern.rfind(delimiter)?;
    if end == 0 {
        return None;
    }
    Some((&pattern[1..end], &pattern[end + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(declaration: RuleDeclaration) -> Rule {
        Rule::compile("field", declaration, |_| None).unwrap()
    }

    #[test]
    fn test_length_rules() {
        assert_eq!(compile(RuleDeclaration::MinLength(3)).check(&DataValue::from("Bo")), RuleVerdict::Fail);
        assert_eq!(compile(RuleDeclaration::MaxLength(3)).check(&DataValue::from("Bob")), RuleVerdict::Pass);
        assert_eq!(compile(RuleDeclaration::Length(10)).check(&DataValue::Int(1288483200)), RuleVerdict::Pass);
        assert_eq!(compile(RuleDeclaration::Length(10)).check(&DataValue::Int(0)), RuleVerdict::Fail);
    }

    #[test]
    fn test_required_and_numeric() {
        let required = compile(RuleDeclaration::Required);
        assert_eq!(required.check(&DataValue::from("")), RuleVerdict::Fail);
        assert_eq!(required.check(&DataValue::from("0")), RuleVerdict::Fail);
        assert_eq!(required.check(&DataValue::from("x")), RuleVerdict::Pass);

        let numeric = compile(RuleDeclaration::Numeric);
        assert_eq!(numeric.check(&DataValue::from(" 12.5")), RuleVerdict::Pass);
        assert_eq!(numeric.check(&DataValue::from("12 ")), RuleVerdict::Pass);
        assert_eq!(numeric.check(&DataValue::from(" ")), RuleVerdict::Fail);
        assert_eq!(numeric.check(&DataValue::from("12a")), RuleVerdict::Fail);
        assert_eq!(numeric.check(&DataValue::Bool(true)), RuleVerdict::Fail);
    }

    #[test]
    fn test_delimited_regex() {
        let rule = compile(RuleDeclaration::Regex(
            r"|[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,4}|i".to_string(),
        ));
        assert_eq!(rule.check(&DataValue::from("connec.2002@gmail.com")), RuleVerdict::Pass);
        assert_eq!(rule.check(&DataValue::from("wrong")), RuleVerdict::Fail);

        let plain = compile(RuleDeclaration::Regex("^[a-z]+$".to_string()));
        assert_eq!(plain.check(&DataValue::from("abc")), RuleVerdict::Pass);
    }

    #[test]
    fn test_bad_declarations_are_configuration_errors() {
        let err = Rule::compile("email", RuleDeclaration::Regex("/(/".to_string()), |_| None).unwrap_err();
        assert_eq!(err.kind(), "configuration");

        let err = Rule::compile("email", RuleDeclaration::Regex("/a/q".to_string()), |_| None).unwrap_err();
        assert_eq!(err.kind(), "configuration");

        let err = Rule::compile("five", RuleDeclaration::callback("missing"), |_| None).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_callback_receives_arguments() {
        let multiple_of: ValidationCallback = Arc::new(|value, args| {
            let divisor = args.first().and_then(DataValue::as_i64).unwrap_or(1);
            value.as_i64().is_some_and(|n| n % divisor == 0)
        });
        let rule = Rule::compile(
            "five",
            RuleDeclaration::callback_with("multiple_of", vec![DataValue::Int(5)]),
            |name| (name == "multiple_of").then(|| multiple_of.clone()),
        )
        .unwrap();
        assert_eq!(rule.check(&DataValue::Int(10)), RuleVerdict::Pass);
        assert_eq!(rule.check(&DataValue::Int(7)), RuleVerdict::Fail);
        assert_eq!(rule.declaration().argument(), DataValue::from("multiple_of"));
    }

    #[test]
    fn test_arguments() {
        assert_eq!(RuleDeclaration::Required.argument(), DataValue::from("required"));
        assert_eq!(RuleDeclaration::MinLength(3).argument(), DataValue::Int(3));
    }
}
