//! # positional 模块说明
//!
//! ## 角色定位（Why）
//! - 最早的两种令牌把会话状态写成定长 JSON 数组，字段含义只由位置决定，
//!   可视化名放在令牌头部而非载荷内；
//! - 这里把位置数组改写为带字段名的对象，迁移步骤因此可以按名字读取。
//!
//! ## 载荷布局（What）
//! - 第 1 版（隐式）：完整 JSON 数组
//!   `[timezone, filter, splits, selectedMeasures, pinnedDimensions, pinnedSort]`；
//! - 第 2 版：去掉首尾方括号的数组体
//!   `timezone, filter, splits, multiMeasureMode, singleMeasure, selectedMeasures,
//!    pinnedDimensions, pinnedSort, colors, compare, highlight`，
//!   其中任意对象都可能是回引用，由 [`HashTable`] 还原；
//! - 两者的 `filter`、`splits`、`highlight.delta` 都是旧式表达式对象，留给迁移步骤翻译。

use serde_json::{Map, Value};

use super::{VersionDecoder, unpack};
use crate::{CodecConfig, DecodeError, HashTable, IntermediateState, token::TokenParts};

const V1_FIELDS: [&str; 6] = [
    "timezone",
    "filter",
    "splits",
    "selectedMeasures",
    "pinnedDimensions",
    "pinnedSort",
];

const V2_FIELDS: [&str; 11] = [
    "timezone",
    "filter",
    "splits",
    "multiMeasureMode",
    "singleMeasure",
    "selectedMeasures",
    "pinnedDimensions",
    "pinnedSort",
    "colors",
    "compare",
    "highlight",
];

/// 隐式第 1 版解码器。
#[derive(Clone, Copy, Debug, Default)]
pub struct V1Decoder;

impl VersionDecoder for V1Decoder {
    fn version(&self) -> u32 {
        1
    }

    fn decode(
        &self,
        parts: &TokenParts<'_>,
        config: &CodecConfig,
    ) -> Result<IntermediateState, DecodeError> {
        let visualization = require_visualization(parts)?;
        let text = unpack(parts.payload, config)?;
        let tree: Value = serde_json::from_str(&text)?;
        let Value::Array(items) = tree else {
            return Err(DecodeError::malformed("version 1 payload must be a JSON array"));
        };
        let object = label(visualization, &V1_FIELDS, items)?;
        Ok(IntermediateState::new(1, object))
    }
}

/// 第 2 版解码器，带回引用字典。
#[derive(Clone, Copy, Debug, Default)]
pub struct V2Decoder;

impl VersionDecoder for V2Decoder {
    fn version(&self) -> u32 {
        2
    }

    fn decode(
        &self,
        parts: &TokenParts<'_>,
        config: &CodecConfig,
    ) -> Result<IntermediateState, DecodeError> {
        let visualization = require_visualization(parts)?;
        let text = unpack(parts.payload, config)?;
        let tree: Value = serde_json::from_str(&format!("[{text}]"))?;

        let mut table = HashTable::new(config.max_materialized_nodes);
        let Value::Array(items) = table.resolve(tree)? else {
            return Err(DecodeError::malformed("version 2 payload must be an array body"));
        };
        tracing::debug!(entries = table.len(), "resolved version 2 back-reference dictionary");

        let object = label(visualization, &V2_FIELDS, items)?;
        Ok(IntermediateState::new(2, object))
    }
}

fn require_visualization<'a>(parts: &TokenParts<'a>) -> Result<&'a str, DecodeError> {
    parts
        .visualization
        .ok_or_else(|| DecodeError::malformed("legacy token lacks a visualization header"))
}

fn label(visualization: &str, fields: &[&str], items: Vec<Value>) -> Result<Value, DecodeError> {
    if items.len() != fields.len() {
        return Err(DecodeError::malformed(format!(
            "expected {} positional fields, found {}",
            fields.len(),
            items.len()
        )));
    }
    let mut object = Map::with_capacity(fields.len() + 1);
    object.insert("visualization".to_owned(), Value::from(visualization));
    for (name, item) in fields.iter().zip(items) {
        object.insert((*name).to_owned(), item);
    }
    Ok(Value::Object(object))
}
