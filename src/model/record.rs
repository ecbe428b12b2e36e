//! 记录
//!
//! 一条记录对应表中的一行：字段集合恒等于表结构的字段集合（缺失值为空值），
//! 另有按挂载名存放的关联记录、脏标记和最近一次验证的错误表。
//! 字段访问按能力集检查：主键别名、表字段和关系挂载名之外的名称一律报错。

use crate::error::QuickOrmResult;
use crate::executor::RowMap;
use crate::model::definition::ModelHooks;
use crate::model::registry::ModelInfo;
use crate::types::DataValue;
use crate::validation::ValidationErrors;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// 指代主键字段的别名
pub const PRIMARY_KEY_ALIAS: &str = "primary_key";

/// 挂载在记录上的关联记录
#[derive(Debug, Clone, PartialEq)]
pub enum RelationValue {
    /// 单条（可能没有找到）
    One(Option<Box<Record>>),
    /// 多条，保持查询顺序
    Many(Vec<Record>),
}

impl RelationValue {
    /// 所有关联记录的可变引用
    pub fn records_mut(&mut self) -> Vec<&mut Record> {
        match self {
            RelationValue::One(Some(record)) => vec![record.as_mut()],
            RelationValue::One(None) => Vec::new(),
            RelationValue::Many(records) => records.iter_mut().collect(),
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            RelationValue::One(Some(record)) => record.to_json(),
            RelationValue::One(None) => JsonValue::Null,
            RelationValue::Many(records) => JsonValue::Array(records.iter().map(Record::to_json).collect()),
        }
    }
}

/// 记录
#[derive(Clone)]
pub struct Record {
    model: Arc<ModelInfo>,
    fields: HashMap<String, DataValue>,
    relations: HashMap<String, RelationValue>,
    dirty: bool,
    errors: ValidationErrors,
}

impl Record {
    /// 构造新记录
    ///
    /// 先填入表的默认值，执行构造前钩子，再覆盖给定的字段值，最后执行构造后钩子。
    /// 新记录总是脏的
    pub fn new(model: Arc<ModelInfo>, values: Vec<(String, DataValue)>) -> QuickOrmResult<Self> {
        let mut fields: HashMap<String, DataValue> =
            model.fields().into_iter().map(|field| (field, DataValue::Null)).collect();
        fields.extend(model.default_record());

        let mut record = Self {
            model,
            fields,
            relations: HashMap::new(),
            dirty: true,
            errors: ValidationErrors::new(),
        };

        let hooks = record.model.hooks().clone();
        ModelHooks::run(&hooks.before_construct, &mut record);
        for (name, value) in values {
            record.set(&name, value)?;
        }
        ModelHooks::run(&hooks.after_construct, &mut record);
        record.dirty = true;
        Ok(record)
    }

    /// 由查询结果的一行构造记录
    ///
    /// 行中没有的字段为空值，行中多余的列被忽略；同样执行构造钩子，结果不是脏的
    pub fn hydrate(model: Arc<ModelInfo>, row: RowMap) -> Self {
        let mut fields: HashMap<String, DataValue> =
            model.fields().into_iter().map(|field| (field, DataValue::Null)).collect();
        for (column, value) in row {
            if let Some(slot) = fields.get_mut(&column) {
                *slot = value;
            }
        }

        let mut record = Self {
            model,
            fields,
            relations: HashMap::new(),
            dirty: false,
            errors: ValidationErrors::new(),
        };
        let hooks = record.model.hooks().clone();
        ModelHooks::run(&hooks.before_construct, &mut record);
        ModelHooks::run(&hooks.after_construct, &mut record);
        record.dirty = false;
        record
    }

    /// 模型信息
    pub fn model(&self) -> &Arc<ModelInfo> {
        &self.model
    }

    /// 模型完整名称
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// 名称是否可访问
    pub fn has(&self, name: &str) -> bool {
        self.model.is_accessible(name)
    }

    fn field_name<'a>(&'a self, name: &'a str) -> QuickOrmResult<&'a str> {
        let resolved = if name == PRIMARY_KEY_ALIAS {
            self.model.primary_key().unwrap_or(name)
        } else {
            name
        };
        if self.fields.contains_key(resolved) {
            Ok(resolved)
        } else {
            Err(crate::orm_error!(field, self.model.name(), name))
        }
    }

    /// 读取字段值，`primary_key` 指代主键字段
    pub fn get(&self, name: &str) -> QuickOrmResult<&DataValue> {
        let field = self.field_name(name)?;
        self.fields
            .get(field)
            .ok_or_else(|| crate::orm_error!(field, self.model.name(), name))
    }

    /// 设置字段值并标记为脏，值按列类别转换
    pub fn set<V: Into<DataValue>>(&mut self, name: &str, value: V) -> QuickOrmResult<()> {
        let field = self.field_name(name)?.to_string();
        let value = self.model.schema().coerce(&field, value.into());
        self.fields.insert(field, value);
        self.dirty = true;
        Ok(())
    }

    /// 主键值，未设置时为 None
    pub fn primary_key_value(&self) -> Option<&DataValue> {
        let pk = self.model.primary_key()?;
        self.fields.get(pk).filter(|value| !value.is_null())
    }

    /// 关联记录，未挂载时为 None
    pub fn relation(&self, alias: &str) -> QuickOrmResult<Option<&RelationValue>> {
        self.check_relation(alias)?;
        Ok(self.relations.get(alias))
    }

    /// 关联记录的可变引用
    pub fn relation_mut(&mut self, alias: &str) -> QuickOrmResult<Option<&mut RelationValue>> {
        self.check_relation(alias)?;
        self.dirty = true;
        Ok(self.relations.get_mut(alias))
    }

    /// 单条关联记录
    pub fn related_one(&self, alias: &str) -> QuickOrmResult<Option<&Record>> {
        Ok(match self.relation(alias)? {
            Some(RelationValue::One(Some(record))) => Some(record.as_ref()),
            Some(RelationValue::Many(records)) => records.first(),
            _ => None,
        })
    }

    /// 多条关联记录，未挂载时为空
    pub fn related_many(&self, alias: &str) -> QuickOrmResult<&[Record]> {
        Ok(match self.relation(alias)? {
            Some(RelationValue::Many(records)) => records.as_slice(),
            Some(RelationValue::One(Some(record))) => std::slice::from_ref(record.as_ref()),
            _ => &[],
        })
    }

    /// 单条关联记录的可变引用
    pub fn related_one_mut(&mut self, alias: &str) -> QuickOrmResult<Option<&mut Record>> {
        Ok(match self.relation_mut(alias)? {
            Some(RelationValue::One(Some(record))) => Some(record.as_mut()),
            Some(RelationValue::Many(records)) => records.first_mut(),
            _ => None,
        })
    }

    /// 多条关联记录的可变引用
    pub fn related_many_mut(&mut self, alias: &str) -> QuickOrmResult<Vec<&mut Record>> {
        Ok(match self.relation_mut(alias)? {
            Some(value) => value.records_mut(),
            None => Vec::new(),
        })
    }

    /// 挂载单条关联记录并标记为脏
    pub fn set_related_one(&mut self, alias: &str, record: Option<Record>) -> QuickOrmResult<()> {
        self.set_relation(alias, RelationValue::One(record.map(Box::new)))
    }

    /// 挂载多条关联记录并标记为脏
    pub fn set_related_many(&mut self, alias: &str, records: Vec<Record>) -> QuickOrmResult<()> {
        self.set_relation(alias, RelationValue::Many(records))
    }

    /// 挂载关联记录并标记为脏
    pub fn set_relation(&mut self, alias: &str, value: RelationValue) -> QuickOrmResult<()> {
        self.check_relation(alias)?;
        self.relations.insert(alias.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    /// 级联查询挂载，不改变脏标记
    pub(crate) fn attach(&mut self, alias: &str, value: RelationValue) {
        self.relations.insert(alias.to_string(), value);
    }

    /// 级联保存使用的可变引用，不改变脏标记
    pub(crate) fn attached_mut(&mut self, alias: &str) -> Vec<&mut Record> {
        match self.relations.get_mut(alias) {
            Some(value) => value.records_mut(),
            None => Vec::new(),
        }
    }

    fn check_relation(&self, alias: &str) -> QuickOrmResult<()> {
        if self.model.relation(alias).is_some() {
            Ok(())
        } else {
            Err(crate::orm_error!(field, self.model.name(), alias))
        }
    }

    /// 是否有未保存的修改
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// 最近一次验证的错误表
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub(crate) fn set_errors(&mut self, errors: ValidationErrors) {
        self.errors = errors;
    }

    /// 按表中顺序的字段和值
    pub fn values(&self) -> Vec<(String, DataValue)> {
        self.model
            .fields()
            .into_iter()
            .map(|field| {
                let value = self.fields.get(&field).cloned().unwrap_or_default();
                (field, value)
            })
            .collect()
    }

    /// 只含字段的映射
    pub fn to_map(&self) -> HashMap<String, DataValue> {
        self.fields.clone()
    }

    /// 字段和已挂载的关联记录
    pub fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        for (field, value) in self.values() {
            object.insert(field, value.to_json_value());
        }
        let relations: BTreeMap<&String, &RelationValue> = self.relations.iter().collect();
        for (alias, value) in relations {
            object.insert(alias.clone(), value.to_json());
        }
        JsonValue::Object(object)
    }
}

impl PartialEq for Record {
    /// 比较模型、字段和关联记录，忽略脏标记和错误表
    fn eq(&self, other: &Self) -> bool {
        self.model.name() == other.model.name()
            && self.fields == other.fields
            && self.relations == other.relations
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: BTreeMap<&String, &DataValue> = self.fields.iter().collect();
        let relations: BTreeMap<&String, &RelationValue> = self.relations.iter().collect();
        f.debug_struct("Record")
            .field("model", &self.model.name())
            .field("fields", &fields)
            .field("relations", &relations)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::definition::ModelHooks;
    use crate::model::relation::{RelationDescriptor, RelationKind};
    use crate::table::TableSchema;

    fn describe_row(field: &str, sql_type: &str, key: &str, default: DataValue) -> RowMap {
        let mut row = RowMap::new();
        row.insert("Field".to_string(), DataValue::from(field));
        row.insert("Type".to_string(), DataValue::from(sql_type));
        row.insert("Null".to_string(), DataValue::from("YES"));
        row.insert("Key".to_string(), DataValue::from(key));
        row.insert("Default".to_string(), default);
        row.insert("Extra".to_string(), DataValue::from(""));
        row
    }

    fn user_info(hooks: ModelHooks) -> Arc<ModelInfo> {
        let rows = vec![
            describe_row("id", "int(11)", "PRI", DataValue::Null),
            describe_row("name", "varchar(64)", "", DataValue::from("guest")),
            describe_row("joined", "int(11)", "", DataValue::from("0")),
        ];
        let schema = TableSchema::from_describe("users", "User", &rows).unwrap();
        Arc::new(ModelInfo {
            name: "User".to_string(),
            short_name: "User".to_string(),
            table_name: "users".to_string(),
            schema: Arc::new(schema),
            relations: vec![RelationDescriptor::new(
                RelationKind::HasMany,
                "Post",
                "Post",
                "user_id".to_string(),
                None,
            )],
            rules: Vec::new(),
            hooks,
        })
    }

    #[test]
    fn test_new_applies_defaults_and_hooks() {
        let mut hooks = ModelHooks::default();
        hooks.before_construct.push(Arc::new(|record: &mut Record| {
            let _ = record.set("joined", 100);
        }));
        hooks.after_construct.push(Arc::new(|record: &mut Record| {
            let name = record.get("name").map(DataValue::to_plain_string).unwrap_or_default();
            let _ = record.set("name", name.to_uppercase());
        }));

        let record = Record::new(user_info(hooks), vec![("name".to_string(), DataValue::from("bob"))]).unwrap();
        assert_eq!(record.get("name").unwrap(), &DataValue::from("BOB"));
        assert_eq!(record.get("joined").unwrap(), &DataValue::Int(100));
        assert!(record.get("primary_key").unwrap().is_null());
        assert!(record.primary_key_value().is_none());
        assert!(record.is_dirty());
    }

    #[test]
    fn test_hydrate_is_clean_and_complete() {
        let mut row = RowMap::new();
        row.insert("id".to_string(), DataValue::Int(4));
        row.insert("extra".to_string(), DataValue::from("ignored"));
        let mut record = Record::hydrate(user_info(ModelHooks::default()), row);

        assert!(!record.is_dirty());
        assert_eq!(record.primary_key_value(), Some(&DataValue::Int(4)));
        assert!(record.get("name").unwrap().is_null());
        assert_eq!(record.get("extra").unwrap_err().kind(), "field_access");
        assert_eq!(record.to_map().len(), 3);

        record.set("joined", "12").unwrap();
        assert_eq!(record.get("joined").unwrap(), &DataValue::Int(12));
        assert!(record.is_dirty());
    }

    #[test]
    fn test_relations_are_gated_by_alias() {
        let info = user_info(ModelHooks::default());
        let mut record = Record::hydrate(info.clone(), RowMap::new());
        assert!(record.relation("Posts").unwrap().is_none());
        assert!(record.related_many("Posts").unwrap().is_empty());
        assert_eq!(record.relation("Post").unwrap_err().kind(), "field_access");

        let post = Record::hydrate(info, RowMap::new());
        record.set_related_many("Posts", vec![post]).unwrap();
        assert!(record.is_dirty());
        assert_eq!(record.related_many("Posts").unwrap().len(), 1);
        assert_eq!(record.to_json()["Posts"].as_array().map(Vec::len), Some(1));
    }
}
