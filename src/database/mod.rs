//! 数据库门面
//!
//! 包装一个 [`SqlExecutor`]，负责连接检查、错误包装、语句耗时记录和查询日志。
//! 开启调试写入模式后，写语句只记录不执行。

use crate::config::{ConnectionOptions, OrmConfig};
use crate::error::QuickOrmResult;
use crate::executor::{QueryOutput, SqlExecutor};
use crate::i18n::t;
use parking_lot::Mutex;
use rat_logger::{debug, info, warn};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 查询日志条目
#[derive(Debug, Clone, PartialEq)]
pub struct QueryLogEntry {
    /// 语句文本
    pub sql: String,
    /// 插入ID
    pub insert_id: Option<i64>,
    /// 结果行数
    pub num_result_rows: Option<u64>,
    /// 影响行数
    pub num_affected_rows: Option<u64>,
    /// 执行失败时的错误
    pub error: Option<String>,
    /// 耗时
    pub elapsed: Duration,
}

/// 数据库门面
pub struct Database {
    executor: Arc<dyn SqlExecutor>,
    debug_mutations: bool,
    log_capacity: usize,
    log: Mutex<VecDeque<QueryLogEntry>>,
}

impl Database {
    /// 用执行器创建门面，默认不开启调试写入，日志保留 256 条
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self {
            executor,
            debug_mutations: false,
            log_capacity: 256,
            log: Mutex::new(VecDeque::new()),
        }
    }

    /// 按配置创建门面
    pub fn with_config(executor: Arc<dyn SqlExecutor>, config: &OrmConfig) -> Self {
        if config.debug_mutations {
            warn!("调试写入模式已开启，写语句将只记录不执行");
        }
        Self {
            executor,
            debug_mutations: config.debug_mutations,
            log_capacity: config.query_log_capacity,
            log: Mutex::new(VecDeque::new()),
        }
    }

    /// 开关调试写入模式
    pub fn set_debug_mutations(&mut self, enabled: bool) {
        self.debug_mutations = enabled;
    }

    /// 是否处于调试写入模式
    pub fn debug_mutations(&self) -> bool {
        self.debug_mutations
    }

    /// 建立连接
    pub async fn connect(&self, options: &ConnectionOptions) -> QuickOrmResult<bool> {
        info!("连接数据库: 执行器={}, 驱动={:?}", self.executor.name(), options.driver);
        self.executor.connect(options).await
    }

    /// 是否已连接
    pub fn is_connected(&self) -> bool {
        self.executor.is_connected()
    }

    /// 执行一条语句
    ///
    /// 驱动错误包装为带语句文本的 `QueryError`，不做任何重试
    pub async fn query(&self, sql: &str) -> QuickOrmResult<QueryOutput> {
        if !self.executor.is_connected() {
            return Err(crate::orm_error!(connection, t("error.not_connected")));
        }

        if self.debug_mutations && Self::is_mutation(sql) {
            info!("调试写入模式，跳过执行: {}", sql);
            let output = QueryOutput::mutation(1, None);
            self.record(sql, &output, None, Duration::ZERO);
            return Ok(output);
        }

        let started = Instant::now();
        let result = self.executor.query(sql).await;
        let elapsed = started.elapsed();

        match result {
            Ok(output) => {
                debug!("执行语句 ({:?}): {}", elapsed, sql);
                self.record(sql, &output, None, elapsed);
                Ok(output)
            }
            Err(e) => {
                warn!("语句执行失败 ({:?}): {} => {}", elapsed, sql, e.message);
                self.record(sql, &QueryOutput::default(), Some(e.message.clone()), elapsed);
                Err(crate::orm_error!(query, sql, e.message))
            }
        }
    }

    /// 转义字符串字面量
    pub fn escape(&self, value: &str) -> String {
        self.executor.escape(value)
    }

    /// 查询日志快照，按执行顺序
    pub fn queries(&self) -> Vec<QueryLogEntry> {
        self.log.lock().iter().cloned().collect()
    }

    /// 清空查询日志
    pub fn clear_query_log(&self) {
        self.log.lock().clear();
    }

    /// 执行器最近一次错误
    pub fn last_error(&self) -> Option<String> {
        self.executor.last_error()
    }

    /// 底层执行器
    pub fn executor(&self) -> &Arc<dyn SqlExecutor> {
        &self.executor
    }

    fn is_mutation(sql: &str) -> bool {
        let keyword = sql
            .trim_start()
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        matches!(keyword.as_str(), "insert" | "update" | "delete" | "truncate")
    }

    fn record(&self, sql: &str, output: &QueryOutput, error: Option<String>, elapsed: Duration) {
        if self.log_capacity == 0 {
            return;
        }
        let mut log = self.log.lock();
        while log.len() >= self.log_capacity {
            log.pop_front();
        }
        log.push_back(QueryLogEntry {
            sql: sql.to_string(),
            insert_id: output.insert_id(),
            num_result_rows: output.num_result_rows(),
            num_affected_rows: output.num_affected_rows(),
            error,
            elapsed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::memory_config;
    use crate::error::QuickOrmError;
    use crate::executor::{ColumnSpec, MemoryExecutor};

    async fn connected(debug_mutations: bool) -> (Arc<MemoryExecutor>, Database) {
        crate::init();
        let executor = Arc::new(MemoryExecutor::new());
        executor.create_table(
            "users",
            vec![
                ColumnSpec::new("id", "int(11)").primary_key().auto_increment(),
                ColumnSpec::new("name", "varchar(64)"),
            ],
        );
        let config = memory_config(debug_mutations).unwrap();
        let db = Database::with_config(executor.clone(), &config);
        db.connect(&config.connection).await.unwrap();
        (executor, db)
    }

    #[tokio::test]
    async fn test_query_requires_connection() {
        crate::init();
        let db = Database::new(Arc::new(MemoryExecutor::new()));
        let err = db.query("select * from `users`").await.unwrap_err();
        assert!(matches!(err, QuickOrmError::ConnectionError { .. }));
    }

    #[tokio::test]
    async fn test_driver_error_carries_statement() {
        let (_, db) = connected(false).await;
        let err = db.query("select * from `missing`").await.unwrap_err();
        match err {
            QuickOrmError::QueryError { sql, .. } => assert_eq!(sql, "select * from `missing`"),
            other => panic!("意外的错误类型: {:?}", other),
        }
        let log = db.queries();
        assert_eq!(log.len(), 1);
        assert!(log[0].error.is_some());
    }

    #[tokio::test]
    async fn test_query_log_records_counts() {
        let (_, db) = connected(false).await;
        db.query("insert into `users` (`name`) values ('Bob')").await.unwrap();
        db.query("select * from `users`").await.unwrap();

        let log = db.queries();
        assert_eq!(log[0].insert_id, Some(1));
        assert_eq!(log[0].num_affected_rows, Some(1));
        assert_eq!(log[1].num_result_rows, Some(1));

        db.clear_query_log();
        assert!(db.queries().is_empty());
    }

    #[tokio::test]
    async fn test_debug_mutations_skip_writes() {
        let (executor, db) = connected(true).await;
        let output = db
            .query("insert into `users` (`name`) values ('Bob')")
            .await
            .unwrap();
        assert_eq!(output.num_affected_rows(), Some(1));
        assert_eq!(executor.rows("users").unwrap().len(), 0);

        // 读语句照常执行
        let output = db.query("select * from `users`").await.unwrap();
        assert_eq!(output.num_result_rows(), Some(0));
    }
}
