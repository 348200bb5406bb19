//! 切分（分组维度）及其排序、粒度与条数限制。

use crate::{Duration, ModelError};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SplitKind {
    String,
    Boolean,
    Number,
    Time,
}

impl SplitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitKind::String => "string",
            SplitKind::Boolean => "boolean",
            SplitKind::Number => "number",
            SplitKind::Time => "time",
        }
    }

    pub fn parse(text: &str) -> Result<Self, ModelError> {
        match text {
            "string" => Ok(SplitKind::String),
            "boolean" => Ok(SplitKind::Boolean),
            "number" => Ok(SplitKind::Number),
            "time" => Ok(SplitKind::Time),
            other => Err(ModelError::keyword("split type", other)),
        }
    }
}

/// 分桶粒度：数值切分按步长，时间切分按时长。
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bucket {
    Number(f64),
    Duration(Duration),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        }
    }

    pub fn parse(text: &str) -> Result<Self, ModelError> {
        match text {
            "ascending" => Ok(Direction::Ascending),
            "descending" => Ok(Direction::Descending),
            other => Err(ModelError::keyword("sort direction", other)),
        }
    }
}

/// 按序列排序时参照的周期；对比模式下可按上一周期或差值排序。
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SeriesPeriod {
    #[default]
    Current,
    Previous,
    Delta,
}

impl SeriesPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesPeriod::Current => "",
            SeriesPeriod::Previous => "previous",
            SeriesPeriod::Delta => "delta",
        }
    }

    pub fn parse(text: &str) -> Result<Self, ModelError> {
        match text {
            "" => Ok(SeriesPeriod::Current),
            "previous" => Ok(SeriesPeriod::Previous),
            "delta" => Ok(SeriesPeriod::Delta),
            other => Err(ModelError::keyword("series period", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SortKind {
    Series { period: SeriesPeriod },
    Dimension,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Sort {
    pub reference: String,
    pub kind: SortKind,
    pub direction: Direction,
}

/// 单个切分。
///
/// # 教案式说明
/// - **意图 (Why)**：令牌只能表达相容的粒度，模型层提前拒绝写出后无法读回的组合；
/// - **契约 (What)**：只能经 [`Split::new`] 构造；时间切分只接受时长粒度，数值切分只接受有限的数值步长，
///   其余切分没有粒度；
/// - **风险 (Trade-offs)**：字段私有，调整排序或条数需要重新构造。
#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    dimension: String,
    kind: SplitKind,
    bucket: Option<Bucket>,
    sort: Sort,
    limit: Option<u64>,
}

impl Split {
    pub fn new(
        dimension: impl Into<String>,
        kind: SplitKind,
        bucket: Option<Bucket>,
        sort: Sort,
        limit: Option<u64>,
    ) -> Result<Self, ModelError> {
        let dimension = dimension.into();
        let bucket = match (kind, bucket) {
            (_, None) => None,
            (SplitKind::Number, Some(Bucket::Number(size))) => {
                Some(Bucket::Number(ModelError::finite(size)?))
            }
            (SplitKind::Time, Some(Bucket::Duration(duration))) => {
                Some(Bucket::Duration(duration))
            }
            (kind, Some(_)) => return Err(ModelError::IncompatibleBucket { dimension, kind }),
        };
        Ok(Split {
            dimension,
            kind,
            bucket,
            sort,
            limit,
        })
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn kind(&self) -> SplitKind {
        self.kind
    }

    pub fn bucket(&self) -> Option<&Bucket> {
        self.bucket.as_ref()
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }
}
