//! # definition 模块说明
//!
//! ## 角色定位（Why）
//! - 当前（第 4 版）载荷的线上结构：`serde` 派生的定义类型，与强类型的 [`Essence`] 双向转换；
//! - 字段声明顺序即序列化键序，与历史生产者一致，保证重新编码已分享的当前版本令牌时逐字节不变。
//!
//! ## 契约（What）
//! - [`lower`] 是全函数：任何合法构造的 `Essence` 都能得到定义；
//! - [`lift`] 校验全部领域约束（可视化、时区、时长、区间、关键字），违例即 `MalformedPayload`；
//! - 时间点以毫秒精度的 RFC 3339 UTC 文本表示，含亚毫秒部分时改用纳秒精度以保持往返；
//! - 整数值的浮点数按整数输出（`10` 而非 `10.0`），非有限数值被视为缺省。

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use viewlink_core::{
    BooleanClause, Bounds, Bucket, DateRange, Direction, Duration, Essence, Filter, FilterClause,
    FixedTimeClause, FormatKind, Legend, NumberClause, NumberRange, RelativeTimeClause,
    SeriesFormat, SeriesPeriod, Sort, SortKind, Split, SplitKind, StringAction, StringClause,
    TimePeriod, TimeShift, Timezone, Visualization,
};

use crate::DecodeError;

/// 第 4 版会话定义。
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition4 {
    pub visualization: String,
    pub timezone: String,
    pub filters: Vec<FilterClauseDefinition>,
    pub splits: Vec<SplitDefinition>,
    pub series: Vec<SeriesDefinition>,
    pub pinned_dimensions: Vec<String>,
    pub pinned_sort: String,
    #[serde(default)]
    pub legend: Option<LegendDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_shift: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_cube: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterClauseDefinition {
    Time(TimeFilterDefinition),
    String(StringFilterDefinition),
    Boolean(BooleanFilterDefinition),
    Number(NumberFilterDefinition),
}

/// 时间子句：`timeRanges`（固定）与 `timePeriods`（相对）恰有其一。
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeFilterDefinition {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ranges: Option<Vec<TimeRangeDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_periods: Option<Vec<TimePeriodDefinition>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TimeRangeDefinition {
    pub start: String,
    pub end: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TimePeriodDefinition {
    pub duration: String,
    pub step: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StringFilterDefinition {
    #[serde(rename = "ref")]
    pub reference: String,
    pub action: String,
    pub values: Vec<String>,
    #[serde(default)]
    pub not: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BooleanFilterDefinition {
    #[serde(rename = "ref")]
    pub reference: String,
    pub values: Vec<bool>,
    #[serde(default)]
    pub not: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NumberFilterDefinition {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub not: bool,
    pub ranges: Vec<NumberRangeDefinition>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NumberRangeDefinition {
    pub start: Option<Number>,
    pub end: Option<Number>,
    #[serde(default = "default_bounds")]
    pub bounds: String,
}

fn default_bounds() -> String {
    Bounds::default().as_str().to_owned()
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SplitDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub dimension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<GranularityDefinition>,
    pub sort: SortDefinition,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GranularityDefinition {
    Number(Number),
    Duration(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SortDefinition {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub direction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SeriesDefinition {
    pub reference: String,
    #[serde(default)]
    pub format: FormatDefinition,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct FormatDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendDefinition {
    pub dimension: String,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub values: Map<String, Value>,
    #[serde(default)]
    pub has_null: bool,
}

const SERIES_MEASURE: &str = "measure";

/// 会话快照 → 第 4 版定义。
pub fn lower(essence: &Essence) -> ViewDefinition4 {
    ViewDefinition4 {
        visualization: essence.visualization.as_str().to_owned(),
        timezone: essence.timezone.name().to_owned(),
        filters: essence.filter.clauses().iter().map(lower_clause).collect(),
        splits: essence.splits.iter().map(lower_split).collect(),
        series: essence
            .series
            .iter()
            .map(|series| SeriesDefinition {
                reference: series.reference.clone(),
                format: FormatDefinition {
                    kind: series.format.kind.as_str().to_owned(),
                    value: series.format.value.clone(),
                },
                kind: SERIES_MEASURE.to_owned(),
            })
            .collect(),
        pinned_dimensions: essence.pinned_dimensions.clone(),
        pinned_sort: essence.pinned_sort.clone(),
        legend: essence.legend.as_ref().map(|legend| LegendDefinition {
            dimension: legend.dimension.clone(),
            limit: legend.limit,
            values: legend
                .values
                .iter()
                .map(|(slot, value)| (slot.to_string(), Value::from(value.as_str())))
                .collect(),
            has_null: legend.has_null,
        }),
        time_shift: (!essence.time_shift.is_empty()).then(|| essence.time_shift.to_string()),
        data_cube: essence.data_cube.clone(),
    }
}

fn lower_clause(clause: &FilterClause) -> FilterClauseDefinition {
    match clause {
        FilterClause::FixedTime(fixed) => FilterClauseDefinition::Time(TimeFilterDefinition {
            reference: fixed.reference.clone(),
            time_ranges: Some(
                fixed
                    .values
                    .iter()
                    .map(|range| TimeRangeDefinition {
                        start: format_instant(range.start()),
                        end: format_instant(range.end()),
                    })
                    .collect(),
            ),
            time_periods: None,
        }),
        FilterClause::RelativeTime(relative) => {
            let (kind, step) = match relative.period {
                TimePeriod::Latest => ("latest", -1),
                TimePeriod::Current => ("floored", 0),
                TimePeriod::Previous => ("floored", -1),
            };
            FilterClauseDefinition::Time(TimeFilterDefinition {
                reference: relative.reference.clone(),
                time_ranges: None,
                time_periods: Some(vec![TimePeriodDefinition {
                    duration: relative.duration.to_string(),
                    step,
                    kind: kind.to_owned(),
                }]),
            })
        }
        FilterClause::String(string) => FilterClauseDefinition::String(StringFilterDefinition {
            reference: string.reference.clone(),
            action: string.action.as_str().to_owned(),
            values: string.values.clone(),
            not: string.not,
        }),
        FilterClause::Boolean(boolean) => {
            FilterClauseDefinition::Boolean(BooleanFilterDefinition {
                reference: boolean.reference.clone(),
                values: boolean.values.clone(),
                not: boolean.not,
            })
        }
        FilterClause::Number(number) => FilterClauseDefinition::Number(NumberFilterDefinition {
            reference: number.reference.clone(),
            not: number.not,
            ranges: number
                .ranges
                .iter()
                .map(|range| NumberRangeDefinition {
                    start: range.start().and_then(number_value),
                    end: range.end().and_then(number_value),
                    bounds: range.bounds().as_str().to_owned(),
                })
                .collect(),
        }),
    }
}

fn lower_split(split: &Split) -> SplitDefinition {
    let granularity = match split.bucket() {
        None => None,
        Some(Bucket::Number(size)) => number_value(*size).map(GranularityDefinition::Number),
        Some(Bucket::Duration(duration)) => {
            Some(GranularityDefinition::Duration(duration.to_string()))
        }
    };
    let sort = split.sort();
    let (kind, period) = match sort.kind {
        SortKind::Dimension => ("dimension", None),
        SortKind::Series { period } => ("series", Some(period.as_str().to_owned())),
    };
    SplitDefinition {
        kind: split.kind().as_str().to_owned(),
        dimension: split.dimension().to_owned(),
        granularity,
        sort: SortDefinition {
            reference: sort.reference.clone(),
            kind: kind.to_owned(),
            direction: sort.direction.as_str().to_owned(),
            period,
        },
        limit: split.limit(),
    }
}

/// 第 4 版定义 → 会话快照。
pub fn lift(definition: ViewDefinition4) -> Result<Essence, DecodeError> {
    let time_shift = match definition.time_shift.as_deref() {
        None => TimeShift::EMPTY,
        Some(text) => TimeShift::parse(text)?,
    };
    let legend = definition.legend.map(lift_legend).transpose()?;

    Ok(Essence {
        data_cube: definition.data_cube,
        visualization: Visualization::parse(&definition.visualization)?,
        timezone: Timezone::parse(&definition.timezone)?,
        filter: definition
            .filters
            .into_iter()
            .map(lift_clause)
            .collect::<Result<Vec<_>, _>>()
            .map(Filter::new)?,
        splits: definition
            .splits
            .into_iter()
            .map(lift_split)
            .collect::<Result<_, _>>()?,
        series: definition
            .series
            .into_iter()
            .map(lift_series)
            .collect::<Result<_, _>>()?,
        pinned_dimensions: definition.pinned_dimensions,
        pinned_sort: definition.pinned_sort,
        legend,
        time_shift,
    })
}

fn lift_clause(clause: FilterClauseDefinition) -> Result<FilterClause, DecodeError> {
    match clause {
        FilterClauseDefinition::Time(time) => match (time.time_ranges, time.time_periods) {
            (Some(ranges), None) => {
                let values = ranges
                    .iter()
                    .map(lift_range)
                    .collect::<Result<_, _>>()?;
                Ok(FilterClause::FixedTime(FixedTimeClause {
                    reference: time.reference,
                    values,
                }))
            }
            (None, Some(periods)) => {
                let [period] = periods.as_slice() else {
                    return Err(DecodeError::malformed(
                        "relative time filter must hold exactly one period",
                    ));
                };
                let period_kind = match (period.kind.as_str(), period.step) {
                    ("latest", -1) => TimePeriod::Latest,
                    ("floored", 0) => TimePeriod::Current,
                    ("floored", -1) => TimePeriod::Previous,
                    (kind, step) => {
                        return Err(DecodeError::malformed(format!(
                            "unsupported time period `{kind}` with step {step}"
                        )));
                    }
                };
                Ok(FilterClause::RelativeTime(RelativeTimeClause {
                    reference: time.reference,
                    period: period_kind,
                    duration: Duration::parse(&period.duration)?,
                }))
            }
            _ => Err(DecodeError::malformed(
                "time filter needs either `timeRanges` or `timePeriods`",
            )),
        },
        FilterClauseDefinition::String(string) => Ok(FilterClause::String(StringClause {
            reference: string.reference,
            action: StringAction::parse(&string.action)?,
            values: string.values,
            not: string.not,
        })),
        FilterClauseDefinition::Boolean(boolean) => Ok(FilterClause::Boolean(BooleanClause {
            reference: boolean.reference,
            values: boolean.values,
            not: boolean.not,
        })),
        FilterClauseDefinition::Number(number) => Ok(FilterClause::Number(NumberClause {
            reference: number.reference,
            not: number.not,
            ranges: number
                .ranges
                .iter()
                .map(lift_number_range)
                .collect::<Result<_, _>>()?,
        })),
    }
}

fn lift_range(range: &TimeRangeDefinition) -> Result<DateRange, DecodeError> {
    let start = parse_instant(&range.start)?;
    let end = parse_instant(&range.end)?;
    Ok(DateRange::new(start, end)?)
}

fn lift_number_range(range: &NumberRangeDefinition) -> Result<NumberRange, DecodeError> {
    Ok(NumberRange::new(
        range.start.as_ref().map(number_from).transpose()?,
        range.end.as_ref().map(number_from).transpose()?,
        Bounds::parse(&range.bounds)?,
    )?)
}

fn lift_split(split: SplitDefinition) -> Result<Split, DecodeError> {
    let kind = SplitKind::parse(&split.kind)?;
    let bucket = match split.granularity {
        None => None,
        Some(GranularityDefinition::Number(size)) => Some(Bucket::Number(number_from(&size)?)),
        Some(GranularityDefinition::Duration(text)) => {
            Some(Bucket::Duration(Duration::parse(&text)?))
        }
    };
    let sort_kind = match (split.sort.kind.as_str(), split.sort.period.as_deref()) {
        ("dimension", None | Some("")) => SortKind::Dimension,
        ("series", period) => SortKind::Series {
            period: SeriesPeriod::parse(period.unwrap_or_default())?,
        },
        (kind, _) => {
            return Err(DecodeError::malformed(format!("unsupported sort type `{kind}`")));
        }
    };
    let sort = Sort {
        reference: split.sort.reference,
        kind: sort_kind,
        direction: Direction::parse(&split.sort.direction)?,
    };
    Ok(Split::new(split.dimension, kind, bucket, sort, split.limit)?)
}

fn lift_series(series: SeriesDefinition) -> Result<viewlink_core::Series, DecodeError> {
    if series.kind != SERIES_MEASURE {
        return Err(DecodeError::malformed(format!(
            "unsupported series type `{}`",
            series.kind
        )));
    }
    let kind = if series.format.kind.is_empty() {
        FormatKind::Default
    } else {
        FormatKind::parse(&series.format.kind)?
    };
    Ok(viewlink_core::Series {
        reference: series.reference,
        format: SeriesFormat {
            kind,
            value: series.format.value,
        },
    })
}

fn lift_legend(legend: LegendDefinition) -> Result<Legend, DecodeError> {
    let values = legend
        .values
        .into_iter()
        .map(|(slot, value)| -> Result<(u32, String), DecodeError> {
            let slot = slot
                .parse::<u32>()
                .map_err(|_| DecodeError::malformed(format!("legend slot `{slot}` is not an index")))?;
            match value {
                Value::String(value) => Ok((slot, value)),
                other => Err(DecodeError::malformed(format!(
                    "legend value {other} is not a string"
                ))),
            }
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(Legend {
        dimension: legend.dimension,
        limit: legend.limit,
        values,
        has_null: legend.has_null,
    })
}

pub(crate) fn format_instant(instant: DateTime<Utc>) -> String {
    let precision = if instant.timestamp_subsec_nanos() % 1_000_000 == 0 {
        SecondsFormat::Millis
    } else {
        SecondsFormat::Nanos
    };
    instant.to_rfc3339_opts(precision, true)
}

fn parse_instant(text: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| DecodeError::malformed(format!("invalid instant `{text}`: {err}")))
}

/// 整数值输出为整数；非有限值返回 `None`，模型构造已排除这种输入。
fn number_value(value: f64) -> Option<Number> {
    const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if value.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(&value) {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

fn number_from(number: &Number) -> Result<f64, DecodeError> {
    number
        .as_f64()
        .ok_or_else(|| DecodeError::malformed(format!("number {number} is out of range")))
}
