//! # 全局ORM管理器
//!
//! 进程级的可选管理器槽位，只能设置一次

use crate::error::QuickOrmResult;
use crate::odm::manager_core::OrmManager;
use once_cell::sync::OnceCell;
use rat_logger::info;
use std::sync::Arc;

static GLOBAL_ORM_MANAGER: OnceCell<Arc<OrmManager>> = OnceCell::new();

/// 设置全局管理器，重复设置返回配置错误
pub fn init_global(manager: OrmManager) -> QuickOrmResult<Arc<OrmManager>> {
    let manager = Arc::new(manager);
    GLOBAL_ORM_MANAGER
        .set(manager.clone())
        .map_err(|_| crate::orm_error!(config, "全局ORM管理器已经初始化"))?;
    info!("全局ORM管理器已初始化");
    Ok(manager)
}

/// 获取全局管理器
pub fn global() -> QuickOrmResult<Arc<OrmManager>> {
    GLOBAL_ORM_MANAGER
        .get()
        .cloned()
        .ok_or_else(|| crate::orm_error!(config, "全局ORM管理器尚未初始化"))
}

/// 全局管理器是否已设置
pub fn is_global_initialized() -> bool {
    GLOBAL_ORM_MANAGER.get().is_some()
}
