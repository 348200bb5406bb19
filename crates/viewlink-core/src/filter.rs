//! # filter 模块说明
//!
//! ## 角色定位（Why）
//! - 会话的过滤条件是按维度引用排列的有序子句列表；
//! - 子句是封闭和类型 [`FilterClause`]，消费方穷尽匹配，新增变体会在编译期暴露所有遗漏点。
//!
//! ## 契约（What）
//! - 同一维度引用在一个 [`Filter`] 中至多出现一次：[`Filter::set_clause`] 原位替换同引用子句，否则追加；
//! - 所有更新返回新值，原 `Filter` 保持不变。

use crate::{DateRange, Duration, ModelError};

/// 相对时间子句的周期语义。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TimePeriod {
    /// 截止“当前时刻”的最近一段时长。
    Latest,
    /// 包含当前时刻、按时长取整的周期。
    Current,
    /// 当前周期之前的一个完整周期。
    Previous,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StringAction {
    In,
    Contains,
    Match,
}

impl StringAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StringAction::In => "in",
            StringAction::Contains => "contains",
            StringAction::Match => "match",
        }
    }

    pub fn parse(text: &str) -> Result<Self, ModelError> {
        match text {
            "in" => Ok(StringAction::In),
            "contains" => Ok(StringAction::Contains),
            "match" => Ok(StringAction::Match),
            other => Err(ModelError::keyword("string action", other)),
        }
    }
}

/// 数值区间的开闭形态，文本形如 `"[)"`。
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Bounds {
    #[default]
    ClosedOpen,
    Closed,
    OpenClosed,
    Open,
}

impl Bounds {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bounds::ClosedOpen => "[)",
            Bounds::Closed => "[]",
            Bounds::OpenClosed => "(]",
            Bounds::Open => "()",
        }
    }

    pub fn parse(text: &str) -> Result<Self, ModelError> {
        match text {
            "[)" => Ok(Bounds::ClosedOpen),
            "[]" => Ok(Bounds::Closed),
            "(]" => Ok(Bounds::OpenClosed),
            "()" => Ok(Bounds::Open),
            other => Err(ModelError::keyword("bounds", other)),
        }
    }
}

/// 数值区间；端点缺省表示该侧无界。
///
/// 端点只能是有限值：NaN 与无穷在令牌里没有对应的 JSON 数字，构造时即被拒绝。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberRange {
    start: Option<f64>,
    end: Option<f64>,
    bounds: Bounds,
}

impl NumberRange {
    pub fn new(start: Option<f64>, end: Option<f64>, bounds: Bounds) -> Result<Self, ModelError> {
        Ok(NumberRange {
            start: start.map(ModelError::finite).transpose()?,
            end: end.map(ModelError::finite).transpose()?,
            bounds,
        })
    }

    pub fn start(&self) -> Option<f64> {
        self.start
    }

    pub fn end(&self) -> Option<f64> {
        self.end
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// 固定时间子句：维度被限制在显式给出的区间序列内。编辑界面只使用第一个区间。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FixedTimeClause {
    pub reference: String,
    pub values: Vec<DateRange>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RelativeTimeClause {
    pub reference: String,
    pub period: TimePeriod,
    pub duration: Duration,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StringClause {
    pub reference: String,
    pub action: StringAction,
    pub values: Vec<String>,
    pub not: bool,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BooleanClause {
    pub reference: String,
    pub values: Vec<bool>,
    pub not: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumberClause {
    pub reference: String,
    pub not: bool,
    pub ranges: Vec<NumberRange>,
}

/// 过滤子句。
///
/// # 教案式说明
/// - **意图 (Why)**：以和类型表达“变体 + 能力”，替代运行时类型探测；
/// - **契约 (What)**：每个变体都携带维度引用，可通过 [`FilterClause::reference`] 统一读取；
/// - **风险 (Trade-offs)**：数值子句含 `f64`，整个枚举因此只实现 `PartialEq`。
#[derive(Clone, Debug, PartialEq)]
pub enum FilterClause {
    FixedTime(FixedTimeClause),
    RelativeTime(RelativeTimeClause),
    String(StringClause),
    Boolean(BooleanClause),
    Number(NumberClause),
}

impl FilterClause {
    pub fn reference(&self) -> &str {
        match self {
            FilterClause::FixedTime(clause) => &clause.reference,
            FilterClause::RelativeTime(clause) => &clause.reference,
            FilterClause::String(clause) => &clause.reference,
            FilterClause::Boolean(clause) => &clause.reference,
            FilterClause::Number(clause) => &clause.reference,
        }
    }

    /// 以单个区间构造固定时间子句。
    pub fn fixed_time(reference: impl Into<String>, range: DateRange) -> Self {
        FilterClause::FixedTime(FixedTimeClause {
            reference: reference.into(),
            values: vec![range],
        })
    }
}

/// 有序的过滤子句集合。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<FilterClause>,
}

impl Filter {
    pub fn new(clauses: Vec<FilterClause>) -> Self {
        Filter { clauses }
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clause_for_reference(&self, reference: &str) -> Option<&FilterClause> {
        self.clauses
            .iter()
            .find(|clause| clause.reference() == reference)
    }

    /// 返回替换（或追加）了同引用子句的新过滤器，子句位置保持不变。
    pub fn set_clause(&self, clause: FilterClause) -> Filter {
        let mut clauses = self.clauses.clone();
        match clauses
            .iter()
            .position(|existing| existing.reference() == clause.reference())
        {
            Some(index) => clauses[index] = clause,
            None => clauses.push(clause),
        }
        Filter { clauses }
    }

    pub fn into_clauses(self) -> Vec<FilterClause> {
        self.clauses
    }
}

impl FromIterator<FilterClause> for Filter {
    fn from_iter<I: IntoIterator<Item = FilterClause>>(iter: I) -> Self {
        Filter::new(iter.into_iter().collect())
    }
}
