//! # 保存操作处理器
//!
//! 级联保存的顺序：从属的父记录、记录本身、一对多的子记录、一对一的子记录。
//! 每一步都会执行，结果取全部子保存的与。

use crate::error::QuickOrmResult;
use crate::i18n::t;
use crate::model::{ModelHooks, Record, RelationKind};
use crate::odm::manager_core::OrmManager;
use crate::query::ConditionCompiler;
use crate::types::{DataValue, FindOptions, SaveOptions};
use crate::validation::ValidationIgnore;
use futures::future::{BoxFuture, FutureExt};
use rat_logger::{debug, info};

impl OrmManager {
    /// 保存记录：没有主键或表中没有该主键时插入，否则更新
    ///
    /// 开启验证时，验证失败返回 `false` 且不写入这条记录
    pub async fn save(&self, record: &mut Record, options: SaveOptions) -> QuickOrmResult<bool> {
        self.save_cascading(record, options).await
    }

    fn save_cascading<'a>(&'a self, record: &'a mut Record, options: SaveOptions) -> BoxFuture<'a, QuickOrmResult<bool>> {
        async move {
            let info = record.model().clone();
            let hooks = info.hooks().clone();
            ModelHooks::run(&hooks.before_save, record);

            let mut results = Vec::new();

            if options.cascade {
                for descriptor in info.relations_of(RelationKind::BelongsTo) {
                    let mut parent_key = None;
                    for parent in record.attached_mut(&descriptor.attach_as) {
                        results.push(self.save_cascading(parent, options).await?);
                        parent_key = Some(parent.primary_key_value().cloned().unwrap_or(DataValue::Null));
                    }
                    if let Some(key) = parent_key {
                        record.set(&descriptor.foreign_key, key)?;
                    }
                }
            }

            let exists = match record.primary_key_value().cloned() {
                None => false,
                Some(key) => self
                    .find_first_by(info.name(), crate::model::PRIMARY_KEY_ALIAS, key, FindOptions::new().cascade(false))
                    .await?
                    .is_some(),
            };

            if options.validate {
                let outcome = self.validate(record, &ValidationIgnore::new()).await?;
                if !outcome.is_valid() {
                    info!("记录验证失败，取消保存: {} {:?}", info.name(), record.errors());
                    return Ok(false);
                }
            }

            results.push(if exists {
                self.update(record).await?
            } else {
                self.insert(record).await?
            });

            if options.cascade {
                let own_key = record.primary_key_value().cloned().unwrap_or(DataValue::Null);
                for kind in [RelationKind::HasMany, RelationKind::HasOne] {
                    for descriptor in info.relations_of(kind) {
                        for child in record.attached_mut(&descriptor.attach_as) {
                            child.set(&descriptor.foreign_key, own_key.clone())?;
                            results.push(self.save_cascading(child, options).await?);
                        }
                    }
                }
            }

            ModelHooks::run(&hooks.after_save, record);
            Ok(results.into_iter().all(|saved| saved))
        }
        .boxed()
    }

    /// 直接插入记录，成功后用插入ID回填主键并增加缓存行数
    pub async fn insert(&self, record: &mut Record) -> QuickOrmResult<bool> {
        let info = record.model().clone();
        let values = record.values();
        let pairs: Vec<(&str, &DataValue)> = values.iter().map(|(field, value)| (field.as_str(), value)).collect();
        let sql = ConditionCompiler::new(self.database()).insert(info.table_name(), &pairs)?;
        let output = self.database().query(&sql).await?;

        if let (Some(primary_key), Some(id)) = (info.primary_key(), output.insert_id()) {
            record.set(primary_key, DataValue::Int(id))?;
        }
        // 调试写入模式下语句没有执行，行数保持不变
        if !self.database().debug_mutations() {
            self.schemas().increment_row_count(info.table_name());
        }
        record.mark_clean();
        debug!("插入记录: {} 主键={:?}", info.name(), record.primary_key_value());
        Ok(true)
    }

    /// 直接按主键更新记录，缺少主键时返回 `PersistenceError`
    pub async fn update(&self, record: &mut Record) -> QuickOrmResult<bool> {
        let info = record.model().clone();
        let primary_key = info
            .primary_key()
            .ok_or_else(|| crate::orm_error!(persistence, info.name(), t("error.no_primary_key")))?;
        let key = record
            .primary_key_value()
            .cloned()
            .ok_or_else(|| crate::orm_error!(persistence, info.name(), t("error.primary_key_missing")))?;

        let values = record.values();
        let pairs: Vec<(&str, &DataValue)> = values.iter().map(|(field, value)| (field.as_str(), value)).collect();
        let statement = ConditionCompiler::new(self.database()).update(info.table_name(), primary_key, &key, &pairs)?;
        match statement {
            Some(sql) => {
                self.database().query(&sql).await?;
            }
            None => debug!("没有可更新的字段: {} 主键={}", info.name(), key),
        }
        record.mark_clean();
        debug!("更新记录: {} 主键={}", info.name(), key);
        Ok(true)
    }
}
