//! # 删除操作处理器

use crate::error::QuickOrmResult;
use crate::i18n::t;
use crate::model::Record;
use crate::odm::manager_core::OrmManager;
use crate::query::ConditionCompiler;
use rat_logger::debug;

impl OrmManager {
    /// 按主键删除记录，最多删除一行
    ///
    /// 驱动没有报告影响行数时视为删除成功，缓存行数随之减一
    pub async fn delete(&self, record: &Record) -> QuickOrmResult<bool> {
        let info = record.model().clone();
        let primary_key = info
            .primary_key()
            .ok_or_else(|| crate::orm_error!(persistence, info.name(), t("error.no_primary_key")))?;
        let key = record
            .primary_key_value()
            .ok_or_else(|| crate::orm_error!(persistence, info.name(), t("error.primary_key_missing")))?;

        let sql = ConditionCompiler::new(self.database()).delete(info.table_name(), primary_key, key)?;
        let output = self.database().query(&sql).await?;
        let deleted = output.num_affected_rows().is_none_or(|affected| affected > 0);
        if deleted && !self.database().debug_mutations() {
            self.schemas().decrement_row_count(info.table_name());
        }
        debug!("删除记录: {} 主键={} 结果={}", info.name(), key, deleted);
        Ok(deleted)
    }
}
