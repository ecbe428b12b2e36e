//! 验证结果与忽略列表

use crate::types::DataValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// 验证错误表：字段 -> 规则名 -> 规则参数
pub type ValidationErrors = BTreeMap<String, BTreeMap<String, DataValue>>;

/// 验证结果
///
/// 验证失败是正常的控制流，不作为错误返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    /// 全部通过
    Valid,
    /// 未通过的规则
    Invalid(ValidationErrors),
}

impl ValidationOutcome {
    /// 由错误表构造，空表即为通过
    pub fn from_errors(errors: ValidationErrors) -> Self {
        if errors.is_empty() {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Invalid(errors)
        }
    }

    /// 是否通过
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// 错误表，通过时为 None
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(errors) => Some(errors),
        }
    }
}

/// 验证时忽略的规则
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationIgnore {
    all: HashSet<String>,
    fields: HashMap<String, HashSet<String>>,
}

impl ValidationIgnore {
    /// 不忽略任何规则
    pub fn new() -> Self {
        Self::default()
    }

    /// 对所有字段忽略某条规则
    pub fn rule(mut self, rule: &str) -> Self {
        self.all.insert(rule.to_string());
        self
    }

    /// 对单个字段忽略某条规则
    pub fn rule_for(mut self, field: &str, rule: &str) -> Self {
        self.fields
            .entry(field.to_string())
            .or_default()
            .insert(rule.to_string());
        self
    }

    /// 该字段的该规则是否被忽略
    pub fn ignores(&self, field: &str, rule: &str) -> bool {
        self.all.contains(rule)
            || self
                .fields
                .get(field)
                .is_some_and(|rules| rules.contains(rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_scopes() {
        let ignore = ValidationIgnore::new().rule("unique").rule_for("name", "minlength");
        assert!(ignore.ignores("id", "unique"));
        assert!(ignore.ignores("name", "minlength"));
        assert!(!ignore.ignores("password", "minlength"));
    }

    #[test]
    fn test_outcome_from_errors() {
        assert!(ValidationOutcome::from_errors(ValidationErrors::new()).is_valid());

        let mut errors = ValidationErrors::new();
        errors
            .entry("name".to_string())
            .or_default()
            .insert("required".to_string(), DataValue::from("required"));
        let outcome = ValidationOutcome::from_errors(errors);
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().unwrap()["name"]["required"], DataValue::from("required"));
    }
}
