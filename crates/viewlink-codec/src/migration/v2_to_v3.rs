//! 2 → 3：旧式表达式翻译为子句列表，度量三元组收拢为 `measures`，颜色改为图例。
//!
//! `compare` 字段在第 3 版中没有对应物，被丢弃；高亮中的 `delta` 表达式同样翻译为子句列表。

use serde_json::{Map, Value, json};

use super::expression;
use crate::ir::{array_field, as_object, field, optional, str_field};

pub(super) fn migrate(tree: &Value) -> Result<Value, String> {
    let source = as_object(tree, "version 2 view definition")?;

    let filters = expression::filter_clauses(field(source, "filter")?)?;
    let splits = array_field(source, "splits")?
        .iter()
        .map(expression::split)
        .collect::<Result<Vec<_>, _>>()?;
    let is_multi = field(source, "multiMeasureMode")?
        .as_bool()
        .ok_or_else(|| "`multiMeasureMode` must be a boolean".to_owned())?;

    let mut target = Map::new();
    target.insert(
        "visualization".to_owned(),
        Value::from(str_field(source, "visualization")?),
    );
    target.insert("timezone".to_owned(), Value::from(str_field(source, "timezone")?));
    target.insert("filters".to_owned(), Value::Array(filters));
    target.insert("splits".to_owned(), Value::Array(splits));
    target.insert(
        "measures".to_owned(),
        json!({
            "isMulti": is_multi,
            "single": str_field(source, "singleMeasure")?,
            "multi": array_field(source, "selectedMeasures")?,
        }),
    );
    target.insert(
        "pinnedDimensions".to_owned(),
        Value::Array(array_field(source, "pinnedDimensions")?.clone()),
    );
    target.insert("pinnedSort".to_owned(), Value::from(str_field(source, "pinnedSort")?));
    target.insert("legend".to_owned(), legend(optional(source, "colors"))?);
    target.insert("highlight".to_owned(), highlight(optional(source, "highlight"))?);
    Ok(Value::Object(target))
}

fn legend(colors: Option<&Value>) -> Result<Value, String> {
    let Some(colors) = colors else {
        return Ok(Value::Null);
    };
    let colors = as_object(colors, "colors")?;
    Ok(json!({
        "dimension": str_field(colors, "dimension")?,
        "limit": optional(colors, "limit").cloned().unwrap_or(Value::Null),
        "values": optional(colors, "values").cloned().unwrap_or_else(|| json!({})),
        "hasNull": optional(colors, "hasNull").cloned().unwrap_or(Value::Bool(false)),
    }))
}

fn highlight(highlight: Option<&Value>) -> Result<Value, String> {
    let Some(highlight) = highlight else {
        return Ok(Value::Null);
    };
    let highlight = as_object(highlight, "highlight")?;
    Ok(json!({
        "owner": str_field(highlight, "owner")?,
        "filters": expression::filter_clauses(field(highlight, "delta")?)?,
        "measure": optional(highlight, "measure").cloned().unwrap_or(Value::Null),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(colors: Value) -> Value {
        json!({
            "visualization": "bar-chart",
            "timezone": "Europe/Warsaw",
            "filter": {"op": "literal", "value": true},
            "splits": [{"expression": {"op": "ref", "name": "channel"}}],
            "multiMeasureMode": false,
            "singleMeasure": "count",
            "selectedMeasures": ["count", "added"],
            "pinnedDimensions": [],
            "pinnedSort": "count",
            "colors": colors,
            "compare": null,
            "highlight": null,
        })
    }

    #[test]
    fn measures_and_legend_are_regrouped() {
        let migrated = migrate(&minimal(json!({"dimension": "channel", "values": {"0": "en"}}))).unwrap();
        assert_eq!(
            migrated["measures"],
            json!({"isMulti": false, "single": "count", "multi": ["count", "added"]})
        );
        assert_eq!(
            migrated["legend"],
            json!({"dimension": "channel", "limit": null, "values": {"0": "en"}, "hasNull": false})
        );
        assert_eq!(migrated["filters"], json!([]));
        assert_eq!(migrated["splits"][0]["type"], json!("string"));
        assert!(migrated.get("compare").is_none());
    }

    #[test]
    fn malformed_splits_fail_the_step() {
        let mut tree = minimal(Value::Null);
        tree["splits"] = json!([{"expression": {"op": "literal", "value": 3}}]);
        assert!(migrate(&tree).is_err());
    }
}
