//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use rat_embed_lang::register_translations;

// rat_embed_lang 对重复的 key 直接 panic，翻译只能注册一次
static REGISTERED: OnceCell<()> = OnceCell::new();

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    fn entry(
        translations: &mut HashMap<String, HashMap<String, String>>,
        key: &str,
        zh: &str,
        en: &str,
        ja: &str,
    ) {
        let mut messages = HashMap::new();
        messages.insert("zh-CN".to_string(), zh.to_string());
        messages.insert("en-US".to_string(), en.to_string());
        messages.insert("ja-JP".to_string(), ja.to_string());
        translations.insert(key.to_string(), messages);
    }

    /// 注册所有错误消息翻译，重复调用不会再次注册
    pub fn register_all_translations() {
        REGISTERED.get_or_init(Self::build_and_register);
    }

    fn build_and_register() {
        let mut translations = HashMap::new();

        // 错误类别
        Self::entry(
            &mut translations,
            "error.config",
            "配置错误: {message}",
            "Configuration error: {message}",
            "設定エラー: {message}",
        );
        Self::entry(
            &mut translations,
            "error.schema",
            "无法读取表 '{table}' 的结构: {message}",
            "Cannot load schema of table '{table}': {message}",
            "テーブル '{table}' のスキーマを読み込めません: {message}",
        );
        Self::entry(
            &mut translations,
            "error.connection",
            "数据库连接失败: {message}",
            "Database connection failed: {message}",
            "データベース接続に失敗しました: {message}",
        );
        Self::entry(
            &mut translations,
            "error.query",
            "查询执行失败: {message} (SQL: {sql})",
            "Query execution failed: {message} (SQL: {sql})",
            "クエリ実行が失敗しました: {message} (SQL: {sql})",
        );
        Self::entry(
            &mut translations,
            "error.field_access",
            "模型 '{model}' 不存在字段或关系 '{field}'",
            "Model '{model}' has no field or relation '{field}'",
            "モデル '{model}' にフィールドまたはリレーション '{field}' はありません",
        );
        Self::entry(
            &mut translations,
            "error.persistence",
            "模型 '{model}' 持久化失败: {message}",
            "Persisting model '{model}' failed: {message}",
            "モデル '{model}' の永続化に失敗しました: {message}",
        );
        Self::entry(
            &mut translations,
            "error.serialization",
            "数据序列化失败: {message}",
            "Data serialization failed: {message}",
            "データシリアライズが失敗しました: {message}",
        );

        // 具体原因
        Self::entry(
            &mut translations,
            "error.not_connected",
            "执行器尚未连接",
            "Executor is not connected",
            "エグゼキュータが接続されていません",
        );
        Self::entry(
            &mut translations,
            "error.primary_key_missing",
            "记录缺少主键值",
            "Record has no primary key value",
            "レコードに主キーの値がありません",
        );
        Self::entry(
            &mut translations,
            "error.no_primary_key",
            "表没有主键",
            "Table has no primary key",
            "テーブルに主キーがありません",
        );
        Self::entry(
            &mut translations,
            "error.unknown_model",
            "未注册的模型: {model}",
            "Unknown model: {model}",
            "未登録のモデル: {model}",
        );
        Self::entry(
            &mut translations,
            "error.unknown_rule",
            "字段 '{field}' 的验证规则无效: {message}",
            "Invalid validation rule on field '{field}': {message}",
            "フィールド '{field}' の検証ルールが無効です: {message}",
        );
        Self::entry(
            &mut translations,
            "error.unknown_callback",
            "未注册的验证回调: {name}",
            "Unknown validation callback: {name}",
            "未登録の検証コールバック: {name}",
        );
        Self::entry(
            &mut translations,
            "error.table_not_exist",
            "表不存在",
            "Table does not exist",
            "テーブルが存在しません",
        );

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        // 标准化语言代码
        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }
}


/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{t, tf, set_language, current_language};
