//! # 验证处理器

use crate::error::QuickOrmResult;
use crate::model::{ModelInfo, Record};
use crate::odm::manager_core::OrmManager;
use crate::types::{DataValue, FindOptions};
use crate::validation::{RuleDeclaration, RuleVerdict, ValidationErrors, ValidationIgnore, ValidationOutcome};
use rat_logger::debug;

impl OrmManager {
    /// 按模型规则验证记录，错误表同时保存在记录上
    ///
    /// 字段为空值时只检查 `required`
    pub async fn validate(&self, record: &mut Record, ignore: &ValidationIgnore) -> QuickOrmResult<ValidationOutcome> {
        let info = record.model().clone();
        let mut errors = ValidationErrors::new();

        for field_rules in info.rules() {
            let field = &field_rules.field;
            let value = record.get(field)?.clone();
            for rule in &field_rules.rules {
                if ignore.ignores(field, rule.name()) {
                    continue;
                }
                if value.is_null() && *rule.declaration() != RuleDeclaration::Required {
                    continue;
                }
                let passed = match rule.check(&value) {
                    RuleVerdict::Pass => true,
                    RuleVerdict::Fail => false,
                    RuleVerdict::NeedsLookup => self.is_unique(&info, field, &value).await?,
                };
                if !passed {
                    errors
                        .entry(field.clone())
                        .or_default()
                        .insert(rule.name().to_string(), rule.declaration().argument());
                }
            }
        }

        if !errors.is_empty() {
            debug!("验证未通过: {} {:?}", info.name(), errors);
        }
        record.set_errors(errors.clone());
        Ok(ValidationOutcome::from_errors(errors))
    }

    /// 表中没有任何行使用该值时通过，已保存的记录自己的行同样计入
    async fn is_unique(&self, info: &ModelInfo, field: &str, value: &DataValue) -> QuickOrmResult<bool> {
        let existing = self
            .find_first_by(info.name(), field, value.clone(), FindOptions::new().cascade(false))
            .await?;
        Ok(existing.is_none())
    }
}
