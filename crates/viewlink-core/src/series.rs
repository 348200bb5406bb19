//! 被展示的度量序列及其数字格式。

use crate::ModelError;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FormatKind {
    #[default]
    Default,
    Exact,
    Percent,
    Custom,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Default => "default",
            FormatKind::Exact => "exact",
            FormatKind::Percent => "percent",
            FormatKind::Custom => "custom",
        }
    }

    pub fn parse(text: &str) -> Result<Self, ModelError> {
        match text {
            "default" => Ok(FormatKind::Default),
            "exact" => Ok(FormatKind::Exact),
            "percent" => Ok(FormatKind::Percent),
            "custom" => Ok(FormatKind::Custom),
            other => Err(ModelError::keyword("series format", other)),
        }
    }
}

/// 数字格式；`value` 仅在 `Custom` 下承载格式串，其余类型通常为空。
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SeriesFormat {
    pub kind: FormatKind,
    pub value: String,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Series {
    pub reference: String,
    pub format: SeriesFormat,
}

impl Series {
    /// 以默认格式引用某个度量。
    pub fn measure(reference: impl Into<String>) -> Self {
        Series {
            reference: reference.into(),
            format: SeriesFormat::default(),
        }
    }
}
