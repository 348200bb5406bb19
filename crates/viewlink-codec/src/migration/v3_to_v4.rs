//! 3 → 4：度量改为序列，切分排序标注排序对象类型，高亮被移除。

use serde_json::{Map, Value, json};

use crate::ir::{array_field, as_object, field, str_field};

pub(super) fn migrate(tree: &Value) -> Result<Value, String> {
    let source = as_object(tree, "version 3 view definition")?;

    let splits = array_field(source, "splits")?
        .iter()
        .map(split)
        .collect::<Result<Vec<_>, _>>()?;

    let mut target = Map::new();
    for key in ["visualization", "timezone", "filters"] {
        target.insert(key.to_owned(), field(source, key)?.clone());
    }
    target.insert("splits".to_owned(), Value::Array(splits));
    target.insert("series".to_owned(), Value::Array(series(field(source, "measures")?)?));
    for key in ["pinnedDimensions", "pinnedSort"] {
        target.insert(key.to_owned(), field(source, key)?.clone());
    }
    target.insert(
        "legend".to_owned(),
        source.get("legend").cloned().unwrap_or(Value::Null),
    );
    Ok(Value::Object(target))
}

fn series(measures: &Value) -> Result<Vec<Value>, String> {
    let measures = as_object(measures, "measures")?;
    let is_multi = field(measures, "isMulti")?
        .as_bool()
        .ok_or_else(|| "`isMulti` must be a boolean".to_owned())?;
    let references: Vec<&str> = if is_multi {
        array_field(measures, "multi")?
            .iter()
            .map(|measure| {
                measure
                    .as_str()
                    .ok_or_else(|| "`multi` must contain strings".to_owned())
            })
            .collect::<Result<_, _>>()?
    } else {
        vec![str_field(measures, "single")?]
    };
    Ok(references
        .into_iter()
        .map(|reference| {
            json!({
                "reference": reference,
                "format": {"type": "default", "value": ""},
                "type": "measure",
            })
        })
        .collect())
}

fn split(split: &Value) -> Result<Value, String> {
    let source = as_object(split, "split")?;
    let dimension = str_field(source, "dimension")?;
    let sort = as_object(field(source, "sort")?, "split sort")?;
    let reference = str_field(sort, "ref")?;
    let direction = str_field(sort, "direction")?;
    let sort = if reference == dimension {
        json!({"ref": reference, "type": "dimension", "direction": direction})
    } else {
        json!({"ref": reference, "type": "series", "direction": direction, "period": ""})
    };

    let mut target = source.clone();
    target.insert("sort".to_owned(), sort);
    Ok(Value::Object(target))
}
