//! IANA 时区包装。

use core::{fmt, str::FromStr};

use chrono_tz::Tz;

use crate::ModelError;

/// 会话所使用的时区，按 IANA 名称往返。
///
/// # 教案式说明
/// - **意图 (Why)**：所有日历运算都需要时区，包装一层便于约束默认值与错误类型；
/// - **契约 (What)**：默认值为 `Etc/UTC`；[`Timezone::name`] 返回解析时使用的规范名称。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timezone(Tz);

impl Timezone {
    pub const UTC: Timezone = Timezone(Tz::Etc__UTC);

    pub fn parse(name: &str) -> Result<Self, ModelError> {
        name.parse::<Tz>()
            .map(Timezone)
            .map_err(|_| ModelError::UnknownTimezone {
                name: name.to_owned(),
            })
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Timezone::UTC
    }
}

impl FromStr for Timezone {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Timezone::parse(name)
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
