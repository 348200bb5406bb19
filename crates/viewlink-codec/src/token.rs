//! # token 模块说明
//!
//! ## 语法（What）
//! ```text
//! token   := [ viz "/" ] [ version "/" ] payload
//! viz     := [a-z] [a-z0-9-]*
//! version := [0-9]+
//! ```
//! - 首段全为数字：版本前缀；首段以数字开头却不是合法 `u32`：无法解析的版本；
//! - 首段形如可视化名：旧格式的可视化头，其后若紧跟数字段则一并作为版本前缀，否则为隐式第 1 版；
//! - 其余情况：隐式第 1 版，整个令牌都是载荷。
//!
//! ## 风险（Trade-offs）
//! - 第 1 版载荷本身可能以 `数字/` 开头，与带可视化头的版本前缀在文法上有歧义；
//!   这一歧义沿袭自历史格式，此处按“版本前缀优先”处理。

use crate::DecodeError;

/// 令牌声明的版本。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VersionTag {
    /// 没有版本前缀：最早的隐式格式。
    Implicit,
    Explicit(u32),
}

/// 拆分后的令牌各段，均借用自原始令牌。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TokenParts<'a> {
    pub visualization: Option<&'a str>,
    pub version: VersionTag,
    pub payload: &'a str,
}

pub fn split(token: &str) -> Result<TokenParts<'_>, DecodeError> {
    let implicit = |visualization, payload| TokenParts {
        visualization,
        version: VersionTag::Implicit,
        payload,
    };

    let Some((head, rest)) = token.split_once('/') else {
        return Ok(implicit(None, token));
    };

    if head.starts_with(|ch: char| ch.is_ascii_digit()) {
        let version = parse_version(head)?;
        return Ok(TokenParts {
            visualization: None,
            version: VersionTag::Explicit(version),
            payload: rest,
        });
    }

    if !is_visualization_name(head) {
        return Ok(implicit(None, token));
    }

    match rest.split_once('/') {
        Some((tag, payload)) if !tag.is_empty() && tag.bytes().all(|b| b.is_ascii_digit()) => {
            Ok(TokenParts {
                visualization: Some(head),
                version: VersionTag::Explicit(parse_version(tag)?),
                payload,
            })
        }
        _ => Ok(implicit(Some(head), rest)),
    }
}

fn parse_version(tag: &str) -> Result<u32, DecodeError> {
    if !tag.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::unknown_version(tag));
    }
    tag.parse::<u32>()
        .map_err(|_| DecodeError::unknown_version(tag))
}

fn is_visualization_name(head: &str) -> bool {
    let mut bytes = head.bytes();
    matches!(bytes.next(), Some(b'a'..=b'z'))
        && bytes.all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_tokens_keep_slashes_in_payload() {
        let parts = split("4/N4Ig/abc/def").unwrap();
        assert_eq!(parts.version, VersionTag::Explicit(4));
        assert_eq!(parts.visualization, None);
        assert_eq!(parts.payload, "N4Ig/abc/def");
    }

    #[test]
    fn legacy_header_with_version() {
        let parts = split("line-chart/2/EQUQ/x").unwrap();
        assert_eq!(parts.visualization, Some("line-chart"));
        assert_eq!(parts.version, VersionTag::Explicit(2));
        assert_eq!(parts.payload, "EQUQ/x");
    }

    #[test]
    fn legacy_header_without_version_is_implicit() {
        let parts = split("table/NoIg/og").unwrap();
        assert_eq!(parts.visualization, Some("table"));
        assert_eq!(parts.version, VersionTag::Implicit);
        assert_eq!(parts.payload, "NoIg/og");
    }

    #[test]
    fn unrecognised_prefix_is_all_payload() {
        let parts = split("NoIgogLgxg").unwrap();
        assert_eq!(parts.version, VersionTag::Implicit);
        assert_eq!(parts.payload, "NoIgogLgxg");

        let parts = split("N4Ig/x").unwrap();
        assert_eq!(parts.payload, "N4Ig/x");
    }

    #[test]
    fn unparsable_version_tags() {
        for token in ["4a/xyz", "99999999999/xyz", "table/99999999999/xyz"] {
            let err = split(token).unwrap_err();
            assert!(matches!(err, DecodeError::UnknownVersion { .. }), "{token}");
        }
    }
}
