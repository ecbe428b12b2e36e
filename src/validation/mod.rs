//! 声明式验证模块
//!
//! 规则按字段声明，规范化时编译；逐条检查的结论在这里给出，
//! 需要查表的唯一性规则由管理器在验证时补上

pub mod dates;
pub mod outcome;
pub mod rules;

pub use dates::{DateFormat, parse_date};
pub use outcome::{ValidationErrors, ValidationIgnore, ValidationOutcome};
pub use rules::{Rule, RuleDeclaration, RuleVerdict, ValidationCallback};

/// 一个字段上编译好的规则
#[derive(Debug)]
pub struct FieldRules {
    /// 字段名
    pub field: String,
    /// 按声明顺序的规则
    pub rules: Vec<Rule>,
}
