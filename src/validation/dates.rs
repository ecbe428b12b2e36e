//! 日期解析与格式化
//!
//! 解析接受常见的日期文本；格式既可以是 PHP `date()` 风格的字母，
//! 也可以是含 `%` 的 strftime 格式

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y", "%d %B %Y", "%B %d, %Y"];

/// 解析日期文本，无法识别时返回 None
///
/// 纯日期按当天零点处理，`@` 开头的整数按 Unix 时间戳处理
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(timestamp) = text.strip_prefix('@') {
        return timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// 已校验的日期格式
#[derive(Debug, Clone, PartialEq)]
pub struct DateFormat {
    strftime: String,
}

impl DateFormat {
    /// 解析格式文本，无效的 strftime 格式返回错误描述
    pub fn parse(format: &str) -> Result<Self, String> {
        let strftime = if format.contains('%') {
            format.to_string()
        } else {
            php_to_strftime(format)
        };
        if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
            return Err(format!("无效的日期格式 '{}'", format));
        }
        Ok(Self { strftime })
    }

    /// 对应的 strftime 格式
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// 格式化日期
    pub fn format(&self, date: &NaiveDateTime) -> Option<String> {
        let mut out = String::new();
        write!(out, "{}", date.format(&self.strftime)).ok()?;
        Some(out)
    }
}

/// PHP `date()` 格式字母转换为 strftime，反斜杠转义下一个字符
fn php_to_strftime(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        let mapped = match ch {
            'Y' => "%Y",
            'y' => "%y",
            'm' => "%m",
            'n' => "%-m",
            'd' => "%d",
            'j' => "%-d",
            'H' => "%H",
            'G' => "%-H",
            'h' => "%I",
            'g' => "%-I",
            'i' => "%M",
            's' => "%S",
            'A' => "%p",
            'a' => "%P",
            'D' => "%a",
            'l' => "%A",
            'M' => "%b",
            'F' => "%B",
            'N' => "%u",
            'w' => "%w",
            'U' => "%s",
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut out, escaped);
                }
                continue;
            }
            other => {
                push_literal(&mut out, other);
                continue;
            }
        };
        out.push_str(mapped);
    }
    out
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2010-10-31 12:30:00").is_some());
        assert!(parse_date("2010-10-31").is_some());
        assert!(parse_date("10/31/10 12:30:00").is_some());
        assert!(parse_date("@1288528200").is_some());
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_php_format_letters() {
        let format = DateFormat::parse("Y-m-d H:i:s").unwrap();
        assert_eq!(format.strftime(), "%Y-%m-%d %H:%M:%S");
        let date = parse_date("2010-10-31 12:30:00").unwrap();
        assert_eq!(format.format(&date).unwrap(), "2010-10-31 12:30:00");

        let format = DateFormat::parse(r"d/m/y \a\t H").unwrap();
        assert_eq!(format.format(&date).unwrap(), "31/10/10 at 12");
    }

    #[test]
    fn test_strftime_passthrough() {
        let format = DateFormat::parse("%d.%m.%Y").unwrap();
        let date = parse_date("2010-10-31").unwrap();
        assert_eq!(format.format(&date).unwrap(), "31.10.2010");
        assert!(DateFormat::parse("%Q").is_err());
    }
}
