//! # essence 模块说明
//!
//! ## 角色定位（Why）
//! - `Essence` 是一次数据探索会话的完整快照：可视化、时区、过滤、切分、序列、钉选维度、
//!   图例与对比偏移；它是编解码的输入与输出，也是过滤编辑器提交的目标；
//! - 编辑界面独占持有当前快照，提交新过滤条件时整体替换，而非原地修改。
//!
//! ## 契约（What）
//! - 字段公开以便构造与模式匹配；所有 `with_*` 操作都借用 `&self` 并返回新快照；
//! - 相等性是结构相等：两个快照编码出的令牌相同当且仅当二者相等。

use std::collections::BTreeMap;

use crate::{
    Filter, FilterClause, ModelError, Series, Split, TimeShift, Timekeeper, Timezone,
};

/// 可视化类型（封闭集合）。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Visualization {
    Totals,
    Table,
    LineChart,
    BarChart,
    Heatmap,
}

impl Visualization {
    pub const ALL: [Visualization; 5] = [
        Visualization::Totals,
        Visualization::Table,
        Visualization::LineChart,
        Visualization::BarChart,
        Visualization::Heatmap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visualization::Totals => "totals",
            Visualization::Table => "table",
            Visualization::LineChart => "line-chart",
            Visualization::BarChart => "bar-chart",
            Visualization::Heatmap => "heatmap",
        }
    }

    pub fn parse(name: &str) -> Result<Self, ModelError> {
        Visualization::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == name)
            .ok_or_else(|| ModelError::UnknownVisualization {
                name: name.to_owned(),
            })
    }
}

/// 图例：为某个维度的取值分配颜色槽位。
///
/// `values` 以槽位序号为键，空槽位不出现。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Legend {
    pub dimension: String,
    pub limit: Option<u64>,
    pub values: BTreeMap<u32, String>,
    pub has_null: bool,
}

/// 会话快照。
#[derive(Clone, Debug, PartialEq)]
pub struct Essence {
    /// 数据源引用；历史令牌不携带该信息，解码后为空，由宿主补齐。
    pub data_cube: Option<String>,
    pub visualization: Visualization,
    pub timezone: Timezone,
    pub filter: Filter,
    pub splits: Vec<Split>,
    pub series: Vec<Series>,
    pub pinned_dimensions: Vec<String>,
    pub pinned_sort: String,
    pub legend: Option<Legend>,
    pub time_shift: TimeShift,
}

impl Essence {
    /// 空会话：无过滤、无切分、无序列、`Etc/UTC`、无对比。
    pub fn new(visualization: Visualization) -> Self {
        Essence {
            data_cube: None,
            visualization,
            timezone: Timezone::default(),
            filter: Filter::default(),
            splits: Vec::new(),
            series: Vec::new(),
            pinned_dimensions: Vec::new(),
            pinned_sort: String::new(),
            legend: None,
            time_shift: TimeShift::EMPTY,
        }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    pub fn time_shift(&self) -> &TimeShift {
        &self.time_shift
    }

    pub fn clause_for_reference(&self, reference: &str) -> Option<&FilterClause> {
        self.filter.clause_for_reference(reference)
    }

    /// 替换（或追加）同维度子句后的新快照。
    pub fn with_clause(&self, clause: FilterClause) -> Essence {
        self.with_filter(self.filter.set_clause(clause))
    }

    pub fn with_filter(&self, filter: Filter) -> Essence {
        Essence {
            filter,
            ..self.clone()
        }
    }

    pub fn with_time_shift(&self, time_shift: TimeShift) -> Essence {
        Essence {
            time_shift,
            ..self.clone()
        }
    }

    /// 把相对时间子句按 `timekeeper` 求值为固定区间后的过滤器。
    ///
    /// 无法求值的相对子句原样保留。
    pub fn effective_filter(&self, timekeeper: &Timekeeper) -> Filter {
        self.filter
            .clauses()
            .iter()
            .map(|clause| match clause {
                FilterClause::RelativeTime(relative) => timekeeper
                    .evaluate(relative, self.timezone)
                    .map(FilterClause::FixedTime)
                    .unwrap_or_else(|| clause.clone()),
                other => other.clone(),
            })
            .collect()
    }
}
