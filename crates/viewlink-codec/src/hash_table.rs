//! # hash_table 模块说明
//!
//! ## 角色定位（Why）
//! - 第 2 版令牌用回引用去重重复出现的子结构（同一维度引用、同一时间引用反复出现在过滤与切分里），
//!   解码时需要把回引用还原成完整结构；
//! - 当前编码器从不产出回引用，本模块只服务于旧链接的解码。
//!
//! ## 契约（What）
//! - 回引用标记：恰好只有一个键 `"#"` 且值为非负整数的 JSON 对象；
//! - 其他每个对象在其子节点全部解析完成后按后序追加进字典，数组与标量不入字典；
//! - 读到标记 `#i` 时必须满足 `i < 当前字典长度`，否则为 `InvalidBackReference`：
//!   对象只有在自身完整物化之后才入字典，因此前向引用与自引用都会被拒绝。
//!
//! ## 执行（How）
//! - 字典是只追加的 `Vec<Value>`（arena），回引用就是下标，不存在任何环状指针结构；
//! - 物化节点总数设上限，防止少量回引用层层嵌套后指数级膨胀。

use serde_json::{Map, Value};

use crate::DecodeError;

pub(crate) const MARKER: &str = "#";

/// 回引用字典。
#[derive(Debug)]
pub struct HashTable {
    entries: Vec<Value>,
    materialized: usize,
    max_nodes: usize,
}

impl HashTable {
    pub fn new(max_nodes: usize) -> Self {
        HashTable {
            entries: Vec::new(),
            materialized: 0,
            max_nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 递归还原 `value` 中的全部回引用，同时按后序填充字典。
    pub fn resolve(&mut self, value: Value) -> Result<Value, DecodeError> {
        match value {
            Value::Object(object) => {
                if let Some(index) = back_reference(&object)? {
                    return self.lookup(index);
                }
                let mut resolved = Map::with_capacity(object.len());
                for (key, child) in object {
                    resolved.insert(key, self.resolve(child)?);
                }
                self.count(1)?;
                let resolved = Value::Object(resolved);
                self.entries.push(resolved.clone());
                Ok(resolved)
            }
            Value::Array(items) => {
                self.count(1)?;
                items
                    .into_iter()
                    .map(|item| self.resolve(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            scalar => {
                self.count(1)?;
                Ok(scalar)
            }
        }
    }

    fn lookup(&mut self, index: u64) -> Result<Value, DecodeError> {
        let entry = usize::try_from(index)
            .ok()
            .and_then(|slot| self.entries.get(slot))
            .ok_or(DecodeError::InvalidBackReference {
                index,
                len: self.entries.len(),
            })?;
        let nodes = node_count(entry);
        let entry = entry.clone();
        self.count(nodes)?;
        Ok(entry)
    }

    fn count(&mut self, nodes: usize) -> Result<(), DecodeError> {
        self.materialized = self.materialized.saturating_add(nodes);
        if self.materialized > self.max_nodes {
            return Err(DecodeError::malformed(format!(
                "back-references expand beyond {} nodes",
                self.max_nodes
            )));
        }
        Ok(())
    }
}

/// 识别回引用标记；形似标记但下标非法时报 `MalformedPayload`。
fn back_reference(object: &Map<String, Value>) -> Result<Option<u64>, DecodeError> {
    if object.len() != 1 {
        return Ok(None);
    }
    match object.get(MARKER) {
        None => Ok(None),
        Some(index) => index
            .as_u64()
            .map(Some)
            .ok_or_else(|| DecodeError::malformed(format!("invalid back-reference index {index}"))),
    }
}

fn node_count(value: &Value) -> usize {
    match value {
        Value::Object(object) => 1 + object.values().map(node_count).sum::<usize>(),
        Value::Array(items) => 1 + items.iter().map(node_count).sum::<usize>(),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_references_to_earlier_objects() {
        let mut table = HashTable::new(1_000);
        let tree = json!([
            {"op": "ref", "name": "time"},
            {"op": "overlap", "operand": {"#": 0}},
        ]);
        let resolved = table.resolve(tree).unwrap();
        assert_eq!(
            resolved,
            json!([
                {"op": "ref", "name": "time"},
                {"op": "overlap", "operand": {"op": "ref", "name": "time"}},
            ])
        );
        assert_eq!(table.len(), 2, "回引用本身不入字典");
    }

    #[test]
    fn forward_reference_is_rejected() {
        let mut table = HashTable::new(1_000);
        let err = table.resolve(json!([{"#": 0}, {"op": "ref"}])).unwrap_err();
        assert_eq!(err, DecodeError::InvalidBackReference { index: 0, len: 0 });
    }

    #[test]
    fn object_cannot_reference_itself() {
        let mut table = HashTable::new(1_000);
        let err = table
            .resolve(json!([{"op": "ref"}, {"op": "and", "operand": {"#": 1}}]))
            .unwrap_err();
        assert_eq!(err, DecodeError::InvalidBackReference { index: 1, len: 1 });
    }

    #[test]
    fn non_integer_marker_is_malformed() {
        let mut table = HashTable::new(1_000);
        let err = table.resolve(json!({"#": "zero"})).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { .. }));
    }

    #[test]
    fn expansion_is_bounded() {
        // 每层对象引用上一层两次，节点数随层数指数增长。
        let mut layers = vec![json!({"leaf": 1})];
        for level in 0..30u64 {
            layers.push(json!({"l": {"#": level}, "r": {"#": level}}));
        }
        let mut table = HashTable::new(10_000);
        let err = table.resolve(Value::Array(layers)).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { .. }));
    }
}
