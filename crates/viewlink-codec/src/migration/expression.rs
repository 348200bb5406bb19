//! # expression 模块说明
//!
//! ## 角色定位（Why）
//! - 第 1、2 版把过滤条件与切分存成旧式表达式树（`{"op": "and", "operand": ..., "expression": ...}`），
//!   第 3 版起改为扁平的子句列表；本模块负责这一翻译。
//!
//! ## 可识别的形状（What）
//! - `and` 链按“左侧优先”展开为子句序列；`literal true`（或 `null`）表示没有过滤；
//! - `overlap`/`in`（维度引用 × 字面量）：`TIME_RANGE` → 固定时间；`SET` 按元素类型分为
//!   字符串 `in`、布尔、数值区间、时间区间集合；`NUMBER_RANGE` → 单个数值区间；
//! - `overlap`（维度引用 × `timeRange`）：操作数是 `m`/`n` 引用时为 `latest`，外包 `timeFloor` 时为 `floored`；
//! - `contains` → 字符串 `contains`，`match` → 字符串 `match`，`not(x)` → `x` 且 `not = true`；
//! - 其他形状一律报错，由调用方包装为 `MigrationFailed`。

use serde_json::{Map, Value, json};

use crate::ir::{as_object, field, optional, str_field};

const DEFAULT_BOUNDS: &str = "[)";

/// 把旧式过滤表达式翻译为第 3 版子句列表。
pub(super) fn filter_clauses(expression: &Value) -> Result<Vec<Value>, String> {
    if expression.is_null() || is_literal_true(expression) {
        return Ok(Vec::new());
    }
    let mut leaves = Vec::new();
    flatten_and(expression, &mut leaves)?;
    leaves.into_iter().map(clause).collect()
}

fn is_literal_true(expression: &Value) -> bool {
    expression.get("op").and_then(Value::as_str) == Some("literal")
        && expression.get("value") == Some(&Value::Bool(true))
}

fn flatten_and<'a>(expression: &'a Value, leaves: &mut Vec<&'a Value>) -> Result<(), String> {
    let object = as_object(expression, "filter expression")?;
    if str_field(object, "op")? == "and" {
        flatten_and(field(object, "operand")?, leaves)?;
        flatten_and(field(object, "expression")?, leaves)?;
    } else {
        leaves.push(expression);
    }
    Ok(())
}

fn clause(expression: &Value) -> Result<Value, String> {
    let object = as_object(expression, "filter expression")?;
    match str_field(object, "op")? {
        "not" => negate(clause(field(object, "operand")?)?),
        "overlap" | "in" => {
            let reference = reference_name(field(object, "operand")?)?;
            overlap_clause(reference, field(object, "expression")?)
        }
        "contains" => {
            let reference = reference_name(field(object, "operand")?)?;
            let needle = literal_value(field(object, "expression")?)?;
            let needle = needle
                .as_str()
                .ok_or_else(|| "`contains` expects a string literal".to_owned())?;
            Ok(string_clause(reference, "contains", vec![Value::from(needle)]))
        }
        "match" => {
            let reference = reference_name(field(object, "operand")?)?;
            let pattern = str_field(object, "regexp")?;
            Ok(string_clause(reference, "match", vec![Value::from(pattern)]))
        }
        other => Err(format!("unsupported filter operator `{other}`")),
    }
}

fn negate(mut clause: Value) -> Result<Value, String> {
    match clause.get_mut("not") {
        Some(flag) => {
            *flag = Value::Bool(true);
            Ok(clause)
        }
        None => Err("time filters cannot be negated".to_owned()),
    }
}

fn overlap_clause(reference: &str, target: &Value) -> Result<Value, String> {
    let object = as_object(target, "overlap target")?;
    match str_field(object, "op")? {
        "literal" => literal_clause(reference, object),
        "timeRange" => relative_clause(reference, object),
        other => Err(format!("unsupported overlap target `{other}`")),
    }
}

fn literal_clause(reference: &str, literal: &Map<String, Value>) -> Result<Value, String> {
    let value = field(literal, "value")?;
    match str_field(literal, "type")? {
        "TIME_RANGE" => Ok(time_clause(reference, vec![time_range(value)?])),
        "NUMBER_RANGE" => Ok(number_clause(reference, vec![number_range(value)?])),
        "SET" => {
            let set = as_object(value, "set literal")?;
            let elements = field(set, "elements")?
                .as_array()
                .ok_or_else(|| "set `elements` must be an array".to_owned())?;
            match str_field(set, "setType")? {
                "STRING" => {
                    if !elements.iter().all(Value::is_string) {
                        return Err("STRING set holds non-string elements".to_owned());
                    }
                    Ok(string_clause(reference, "in", elements.clone()))
                }
                "BOOLEAN" => {
                    if !elements.iter().all(Value::is_boolean) {
                        return Err("BOOLEAN set holds non-boolean elements".to_owned());
                    }
                    Ok(json!({
                        "type": "boolean",
                        "ref": reference,
                        "values": elements,
                        "not": false,
                    }))
                }
                "NUMBER_RANGE" => {
                    let ranges = elements.iter().map(number_range).collect::<Result<_, _>>()?;
                    Ok(number_clause(reference, ranges))
                }
                "TIME_RANGE" => {
                    let ranges = elements.iter().map(time_range).collect::<Result<_, _>>()?;
                    Ok(time_clause(reference, ranges))
                }
                other => Err(format!("unsupported set type `{other}`")),
            }
        }
        other => Err(format!("unsupported literal type `{other}`")),
    }
}

fn relative_clause(reference: &str, range: &Map<String, Value>) -> Result<Value, String> {
    let operand = as_object(field(range, "operand")?, "timeRange operand")?;
    let kind = match str_field(operand, "op")? {
        "ref" => {
            anchor_name(operand)?;
            "latest"
        }
        "timeFloor" => {
            anchor_name(as_object(field(operand, "operand")?, "timeFloor operand")?)?;
            "floored"
        }
        other => return Err(format!("unsupported timeRange operand `{other}`")),
    };
    let duration = str_field(range, "duration")?;
    let step = field(range, "step")?
        .as_i64()
        .ok_or_else(|| "`step` must be an integer".to_owned())?;
    Ok(json!({
        "type": "time",
        "ref": reference,
        "timePeriods": [{"duration": duration, "step": step, "type": kind}],
    }))
}

/// `m`（最大时间）或 `n`（当前时间）锚点引用。
fn anchor_name(reference: &Map<String, Value>) -> Result<(), String> {
    if str_field(reference, "op")? != "ref" {
        return Err("time anchor must be a reference".to_owned());
    }
    match str_field(reference, "name")? {
        "m" | "n" => Ok(()),
        other => Err(format!("unknown time anchor `{other}`")),
    }
}

fn time_clause(reference: &str, ranges: Vec<Value>) -> Value {
    json!({"type": "time", "ref": reference, "timeRanges": ranges})
}

fn time_range(value: &Value) -> Result<Value, String> {
    let range = as_object(value, "time range")?;
    Ok(json!({
        "start": str_field(range, "start")?,
        "end": str_field(range, "end")?,
    }))
}

fn number_clause(reference: &str, ranges: Vec<Value>) -> Value {
    json!({"type": "number", "ref": reference, "not": false, "ranges": ranges})
}

fn number_range(value: &Value) -> Result<Value, String> {
    let range = as_object(value, "number range")?;
    let endpoint = |key: &str| match optional(range, key) {
        None => Ok(Value::Null),
        Some(number) if number.is_number() => Ok(number.clone()),
        Some(_) => Err(format!("number range `{key}` must be numeric")),
    };
    let bounds = match optional(range, "bounds") {
        None => DEFAULT_BOUNDS,
        Some(bounds) => bounds
            .as_str()
            .ok_or_else(|| "number range `bounds` must be a string".to_owned())?,
    };
    Ok(json!({"start": endpoint("start")?, "end": endpoint("end")?, "bounds": bounds}))
}

fn string_clause(reference: &str, action: &str, values: Vec<Value>) -> Value {
    json!({
        "type": "string",
        "ref": reference,
        "action": action,
        "values": values,
        "not": false,
    })
}

fn literal_value(expression: &Value) -> Result<&Value, String> {
    let object = as_object(expression, "literal")?;
    if str_field(object, "op")? != "literal" {
        return Err("expected a literal".to_owned());
    }
    field(object, "value")
}

/// 读取 `{"op": "ref", "name": ...}` 的维度名。
pub(super) fn reference_name(expression: &Value) -> Result<&str, String> {
    let object = as_object(expression, "reference")?;
    if str_field(object, "op")? != "ref" {
        return Err("expected a dimension reference".to_owned());
    }
    str_field(object, "name")
}

/// 把旧式切分（表达式 + 分桶/排序/限制动作）翻译为第 3 版切分。
pub(super) fn split(legacy: &Value) -> Result<Value, String> {
    let object = as_object(legacy, "split")?;
    let dimension = reference_name(field(object, "expression")?)?;

    let (kind, granularity) = match optional(object, "bucketAction") {
        None => ("string", None),
        Some(bucket) => {
            let bucket = as_object(bucket, "bucketAction")?;
            match str_field(bucket, "op")? {
                "numberBucket" => ("number", Some(field(bucket, "size")?.clone())),
                "timeBucket" => ("time", Some(Value::from(str_field(bucket, "duration")?))),
                other => return Err(format!("unsupported bucket action `{other}`")),
            }
        }
    };

    let sort = match optional(object, "sortAction") {
        None => json!({"ref": dimension, "direction": "ascending"}),
        Some(sort) => {
            let sort = as_object(sort, "sortAction")?;
            json!({
                "ref": reference_name(field(sort, "expression")?)?,
                "direction": str_field(sort, "direction")?,
            })
        }
    };

    let limit = match optional(object, "limitAction") {
        None => Value::Null,
        Some(limit) => optional(as_object(limit, "limitAction")?, "value")
            .cloned()
            .unwrap_or(Value::Null),
    };

    let mut target = Map::new();
    target.insert("type".to_owned(), Value::from(kind));
    target.insert("dimension".to_owned(), Value::from(dimension));
    if let Some(granularity) = granularity {
        target.insert("granularity".to_owned(), granularity);
    }
    target.insert("sort".to_owned(), sort);
    target.insert("limit".to_owned(), limit);
    Ok(Value::Object(target))
}
