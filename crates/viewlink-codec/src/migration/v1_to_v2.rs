//! 1 → 2：补齐多度量模式、单度量、图例颜色、对比与高亮字段。
//!
//! 第 1 版只有“已选度量”列表且总是多度量展示；单度量取列表首项，列表为空时退回钉选排序度量。

use serde_json::{Map, Value};

use crate::ir::{array_field, as_object, field, str_field};

pub(super) fn migrate(tree: &Value) -> Result<Value, String> {
    let source = as_object(tree, "version 1 view definition")?;
    let selected = array_field(source, "selectedMeasures")?;
    let pinned_sort = str_field(source, "pinnedSort")?;
    let single = match selected.first() {
        Some(first) => first
            .as_str()
            .ok_or_else(|| "`selectedMeasures` must contain strings".to_owned())?,
        None => pinned_sort,
    };

    let mut target = Map::new();
    for key in ["visualization", "timezone", "filter", "splits"] {
        target.insert(key.to_owned(), field(source, key)?.clone());
    }
    target.insert("multiMeasureMode".to_owned(), Value::Bool(true));
    target.insert("singleMeasure".to_owned(), Value::from(single));
    target.insert("selectedMeasures".to_owned(), Value::Array(selected.clone()));
    target.insert(
        "pinnedDimensions".to_owned(),
        field(source, "pinnedDimensions")?.clone(),
    );
    target.insert("pinnedSort".to_owned(), Value::from(pinned_sort));
    for key in ["colors", "compare", "highlight"] {
        target.insert(key.to_owned(), Value::Null);
    }
    Ok(Value::Object(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v1(selected: Value) -> Value {
        json!({
            "visualization": "totals",
            "timezone": "Etc/UTC",
            "filter": null,
            "splits": [],
            "selectedMeasures": selected,
            "pinnedDimensions": [],
            "pinnedSort": "count",
        })
    }

    #[test]
    fn first_selected_measure_becomes_single() {
        let migrated = migrate(&v1(json!(["added", "count"]))).unwrap();
        assert_eq!(migrated["multiMeasureMode"], json!(true));
        assert_eq!(migrated["singleMeasure"], json!("added"));
        assert_eq!(migrated["colors"], Value::Null);
    }

    #[test]
    fn empty_selection_falls_back_to_pinned_sort() {
        let migrated = migrate(&v1(json!([]))).unwrap();
        assert_eq!(migrated["singleMeasure"], json!("count"));
    }

    #[test]
    fn non_string_measure_fails() {
        assert!(migrate(&v1(json!([7]))).is_err());
    }
}
