//! 中间表示：所有版本解码器的共同产物、迁移链的输入输出。

use serde_json::{Map, Value};

/// 松散类型的会话树及其所处的模式版本。
///
/// 本身不承载不变式；每个迁移步骤负责校验自己消费的形状。
#[derive(Clone, Debug, PartialEq)]
pub struct IntermediateState {
    pub version: u32,
    pub tree: Value,
}

impl IntermediateState {
    pub fn new(version: u32, tree: Value) -> Self {
        IntermediateState { version, tree }
    }
}

// 迁移步骤共用的形状读取助手；错误原因由调用方包装进 `MigrationFailed`。

pub(crate) fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, String> {
    value
        .as_object()
        .ok_or_else(|| format!("{what} must be an object"))
}

pub(crate) fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value, String> {
    object.get(key).ok_or_else(|| format!("missing `{key}`"))
}

pub(crate) fn str_field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a str, String> {
    field(object, key)?
        .as_str()
        .ok_or_else(|| format!("`{key}` must be a string"))
}

pub(crate) fn array_field<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Vec<Value>, String> {
    field(object, key)?
        .as_array()
        .ok_or_else(|| format!("`{key}` must be an array"))
}

/// 缺省或 `null` 视为 `None`。
pub(crate) fn optional<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}
