//! 模型模块
//!
//! 模型定义、关系规范化、注册表和记录

pub mod definition;
pub mod record;
pub mod registry;
pub mod relation;

pub use definition::{ModelDefinition, ModelHooks, RecordHook};
pub use record::{PRIMARY_KEY_ALIAS, Record, RelationValue};
pub use registry::{ModelDump, ModelInfo, ModelRegistry};
pub use relation::{RelationDeclaration, RelationDescriptor, RelationKind};
