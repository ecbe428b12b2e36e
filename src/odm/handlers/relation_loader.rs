//! # 关联记录加载
//!
//! 每条记录从调用方给出的已访问集合出发，按一对一、一对多、从属的顺序
//! 处理关系；同一分支上已访问过的模型被跳过，所以环状关系只展开一层。

use crate::error::QuickOrmResult;
use crate::i18n::t;
use crate::model::{Record, RelationKind, RelationValue};
use crate::odm::handlers::read_handler::FindResult;
use crate::odm::manager_core::OrmManager;
use crate::types::DataValue;
use std::collections::HashSet;

impl OrmManager {
    /// 为一组记录挂载关联记录，每条记录使用同一个初始已访问集合
    pub async fn attach_related(&self, records: &mut [Record], visited: &HashSet<String>) -> QuickOrmResult<()> {
        for record in records.iter_mut() {
            self.attach_related_one(record, visited).await?;
        }
        Ok(())
    }

    async fn attach_related_one(&self, record: &mut Record, visited: &HashSet<String>) -> QuickOrmResult<()> {
        let info = record.model().clone();
        let mut processed = visited.clone();

        for descriptor in info.relations() {
            if processed.contains(&descriptor.model) {
                crate::debug_log!(
                    "跳过已访问的关联: {} {} {}",
                    info.name(),
                    descriptor.kind.as_str(),
                    descriptor.model
                );
                continue;
            }
            processed.insert(descriptor.model.clone());

            let target = self.model(&descriptor.model).await?;
            let (field, key) = match descriptor.kind {
                RelationKind::BelongsTo => {
                    let target_primary_key = target.primary_key().ok_or_else(|| {
                        crate::orm_error!(config, format!("{}: {}", t("error.no_primary_key"), target.name()))
                    })?;
                    let key = record.get(&descriptor.foreign_key)?.clone();
                    (target_primary_key.to_string(), key)
                }
                RelationKind::HasOne | RelationKind::HasMany => {
                    let key = record.primary_key_value().cloned().unwrap_or(DataValue::Null);
                    (descriptor.foreign_key.clone(), key)
                }
            };

            let mut options = descriptor.options.clone();
            options.set_condition(&field, key);
            let related = self
                .find_with_visited(target, options, processed.clone())
                .await?;

            let value = match related {
                FindResult::First(found) => RelationValue::One(found.map(Box::new)),
                FindResult::All(found) => RelationValue::Many(found),
            };
            record.attach(&descriptor.attach_as, value);
        }
        Ok(())
    }
}
