//! # duration 模块说明
//!
//! ## 角色定位（Why）
//! - 解析并规范化输出 ISO-8601 风格的时长文本（`P1D`、`PT1H`、`-P3M`、`P2W`），
//!   它同时出现在对比偏移、相对时间条件与时间切分粒度中；
//! - 提供时区感知的平移 [`Duration::shift`] 与取整 [`Duration::floor`]。
//!
//! ## 语法（What）
//! ```text
//! duration := [ "+" | "-" ] "P" ( n "W" | [n "Y"] [n "M"] [n "D"] [ "T" [n "H"] [n "M"] [n "S"] ] )
//! ```
//! - 至少出现一个分量；出现 `T` 时其后至少跟一个分量；
//! - 周分量与其他分量互斥，分量顺序固定且不可重复；
//! - 数值为十进制非负整数，超出 `u32` 视为非法。
//!
//! ## 平移语义（How）
//! - 日历部分（年、月、周、日）在时区的本地挂钟时间上运算：月份溢出时钳制到月末，
//!   夏令时“空洞”中的本地时间向后落到空洞之后，重叠时段取较早的时刻；
//! - 时钟部分（时、分、秒）按流逝时间运算，与时区无关。

use core::{fmt, str::FromStr};

use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone,
    Timelike, Utc,
};

use crate::{ModelError, Timezone};

/// 时长值。
///
/// 字段私有：唯一的构造入口是解析与少量具名构造函数，保证周分量与其他分量互斥。
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Duration {
    negative: bool,
    years: u32,
    months: u32,
    weeks: u32,
    days: u32,
    hours: u32,
    minutes: u32,
    seconds: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Unit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl Duration {
    /// 解析时长文本，语法见模块文档。
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidDuration {
            text: text.to_owned(),
        };

        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let body = unsigned.strip_prefix('P').ok_or_else(invalid)?;
        let (date_part, time_part) = match body.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (body, None),
        };

        let mut duration = Duration {
            negative,
            ..Duration::default()
        };
        let mut saw_week = false;
        let mut saw_other = false;

        let mut rank = 0;
        for (value, unit) in components(date_part).ok_or_else(invalid)? {
            let (next_rank, slot) = match unit {
                'Y' => (1, &mut duration.years),
                'M' => (2, &mut duration.months),
                'W' => (3, &mut duration.weeks),
                'D' => (4, &mut duration.days),
                _ => return Err(invalid()),
            };
            if next_rank <= rank {
                return Err(invalid());
            }
            rank = next_rank;
            *slot = value;
            if unit == 'W' {
                saw_week = true;
            } else {
                saw_other = true;
            }
        }

        if let Some(time_part) = time_part {
            let parsed = components(time_part).ok_or_else(invalid)?;
            if parsed.is_empty() {
                return Err(invalid());
            }
            let mut rank = 0;
            for (value, unit) in parsed {
                let (next_rank, slot) = match unit {
                    'H' => (1, &mut duration.hours),
                    'M' => (2, &mut duration.minutes),
                    'S' => (3, &mut duration.seconds),
                    _ => return Err(invalid()),
                };
                if next_rank <= rank {
                    return Err(invalid());
                }
                rank = next_rank;
                *slot = value;
                saw_other = true;
            }
        }

        if !(saw_week || saw_other) || (saw_week && saw_other) {
            return Err(invalid());
        }
        Ok(duration)
    }

    /// `n` 个日历日。
    pub const fn days(n: u32) -> Self {
        Duration {
            negative: false,
            years: 0,
            months: 0,
            weeks: 0,
            days: n,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// `n` 个小时。
    pub const fn hours(n: u32) -> Self {
        Duration {
            negative: false,
            years: 0,
            months: 0,
            weeks: 0,
            days: 0,
            hours: n,
            minutes: 0,
            seconds: 0,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// 所有分量均为零（符号不计）。
    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.weeks == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
    }

    /// 在 `timezone` 的日历规则下把 `instant` 平移 `step` 倍的本时长。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：对比周期、默认终点、相对时间求值都依赖“按日历移动”，而非固定秒数；
    /// - **契约 (What)**：`step` 为负表示向过去移动；结果超出可表示范围时返回 `None`，从不 panic；
    /// - **执行 (How)**：先在本地挂钟时间上处理年月与周日，再把本地时间映射回 UTC，最后叠加时分秒；
    /// - **风险 (Trade-offs)**：本地时间落入夏令时空洞时采用空洞前的偏移换算，结果会被“推”到空洞之后。
    pub fn shift(
        &self,
        instant: DateTime<Utc>,
        timezone: Timezone,
        step: i32,
    ) -> Option<DateTime<Utc>> {
        let factor = if self.negative {
            -i64::from(step)
        } else {
            i64::from(step)
        };
        if factor == 0 || self.is_zero() {
            return Some(instant);
        }
        let forward = factor > 0;
        let times = factor.unsigned_abs();

        let total_months = (u64::from(self.years) * 12 + u64::from(self.months)).checked_mul(times)?;
        let total_days = (u64::from(self.weeks) * 7 + u64::from(self.days)).checked_mul(times)?;

        let mut moved = instant;
        if total_months > 0 || total_days > 0 {
            let tz = timezone.tz();
            let mut local = instant.with_timezone(&tz).naive_local();
            if total_months > 0 {
                let months = Months::new(u32::try_from(total_months).ok()?);
                local = if forward {
                    local.checked_add_months(months)?
                } else {
                    local.checked_sub_months(months)?
                };
            }
            if total_days > 0 {
                let days = Days::new(total_days);
                local = if forward {
                    local.checked_add_days(days)?
                } else {
                    local.checked_sub_days(days)?
                };
            }
            moved = resolve_local(timezone, local)?;
        }

        let clock_seconds = u64::from(self.hours) * 3_600
            + u64::from(self.minutes) * 60
            + u64::from(self.seconds);
        if clock_seconds > 0 {
            let magnitude = i64::try_from(clock_seconds.checked_mul(times)?).ok()?;
            let delta = TimeDelta::try_seconds(if forward { magnitude } else { -magnitude })?;
            moved = moved.checked_add_signed(delta)?;
        }
        Some(moved)
    }

    /// 把 `instant` 向下取整到本时长的边界（本地时间）。
    ///
    /// 仅支持单一分量的时长：`P1Y`、`PnM`（n 整除 12）、`P1W`（周一起始）、`P1D`、
    /// `PTnH`（n 整除 24）、`PTnM` 与 `PTnS`（n 整除 60）。其余时长返回 `None`。
    pub fn floor(&self, instant: DateTime<Utc>, timezone: Timezone) -> Option<DateTime<Utc>> {
        let (unit, n) = self.single_unit()?;
        let local = instant.with_timezone(&timezone.tz()).naive_local();
        let date = local.date();
        let floored: NaiveDateTime = match unit {
            Unit::Year if n == 1 => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_hms_opt(0, 0, 0)?,
            Unit::Month if 12 % n == 0 => {
                let month0 = date.month0() / n * n;
                NaiveDate::from_ymd_opt(date.year(), month0 + 1, 1)?.and_hms_opt(0, 0, 0)?
            }
            Unit::Week if n == 1 => {
                let back = Days::new(u64::from(date.weekday().num_days_from_monday()));
                date.checked_sub_days(back)?.and_hms_opt(0, 0, 0)?
            }
            Unit::Day if n == 1 => date.and_hms_opt(0, 0, 0)?,
            Unit::Hour if 24 % n == 0 => date.and_hms_opt(local.hour() / n * n, 0, 0)?,
            Unit::Minute if 60 % n == 0 => {
                date.and_hms_opt(local.hour(), local.minute() / n * n, 0)?
            }
            Unit::Second if 60 % n == 0 => {
                date.and_hms_opt(local.hour(), local.minute(), local.second() / n * n)?
            }
            _ => return None,
        };
        resolve_local(timezone, floored)
    }

    fn single_unit(&self) -> Option<(Unit, u32)> {
        let fields = [
            (Unit::Year, self.years),
            (Unit::Month, self.months),
            (Unit::Week, self.weeks),
            (Unit::Day, self.days),
            (Unit::Hour, self.hours),
            (Unit::Minute, self.minutes),
            (Unit::Second, self.seconds),
        ];
        let mut non_zero = fields.iter().filter(|(_, value)| *value > 0);
        let first = non_zero.next().copied()?;
        match non_zero.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

/// 把本地挂钟时间映射回 UTC：重叠取早，空洞按空洞前的偏移换算。
fn resolve_local(timezone: Timezone, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    let tz = timezone.tz();
    if let Some(resolved) = tz.from_local_datetime(&local).earliest() {
        return Some(resolved.with_timezone(&Utc));
    }
    let before = local.checked_sub_signed(TimeDelta::try_hours(24)?)?;
    let offset = tz.offset_from_local_datetime(&before).earliest()?.fix();
    let utc = local.checked_sub_signed(TimeDelta::try_seconds(i64::from(
        offset.local_minus_utc(),
    ))?)?;
    Some(utc.and_utc())
}

/// 把 `12D3H` 这类片段拆成 `(数值, 单位)` 序列；格式不符返回 `None`。
fn components(text: &str) -> Option<Vec<(u32, char)>> {
    let mut parsed = Vec::new();
    let mut digits_start = None;
    for (index, ch) in text.char_indices() {
        if ch.is_ascii_digit() {
            digits_start.get_or_insert(index);
            continue;
        }
        let start = digits_start.take()?;
        let value = text[start..index].parse::<u32>().ok()?;
        parsed.push((value, ch));
    }
    if digits_start.is_some() {
        return None;
    }
    Some(parsed)
}

impl FromStr for Duration {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Duration::parse(text)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        if self.is_zero() {
            return f.write_str("0D");
        }
        for (value, unit) in [
            (self.years, 'Y'),
            (self.months, 'M'),
            (self.weeks, 'W'),
            (self.days, 'D'),
        ] {
            if value > 0 {
                write!(f, "{value}{unit}")?;
            }
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            f.write_str("T")?;
            for (value, unit) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if value > 0 {
                    write!(f, "{value}{unit}")?;
                }
            }
        }
        Ok(())
    }
}
