//! 日期工具
//!
//! 纯函数模块：识别并解析接口返回的两种日期形态，按 .NET 风格的模式串
//! （`yyyy-MM-dd h:mm tt`）格式化与解析表单中的日期文本。

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

pub const DEFAULT_PATTERN: &str = "yyyy-MM-dd h:mm tt";

/// 解析接口日期：`/Date(<millis>)/`（可带 `+hhmm` 时区后缀）或
/// `yyyy-MM-ddTHH:mm:ss(.sss)?Z?`。不符合任一形态时返回 `None`。
pub fn parse_wire_date(value: &str) -> Option<DateTime<Utc>> {
    parse_legacy_date(value).or_else(|| parse_iso_date(value))
}

pub fn is_wire_date(value: &str) -> bool {
    parse_wire_date(value).is_some()
}

/// ASP.NET 旧格式；毫秒数本身就是 UTC，时区后缀只影响显示，这里忽略
fn parse_legacy_date(value: &str) -> Option<DateTime<Utc>> {
    let inner = value.strip_prefix("/Date(")?.strip_suffix(")/")?;

    let digits_end = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .unwrap_or(inner.len());
    let (millis, offset) = inner.split_at(digits_end);

    if !offset.is_empty()
        && (offset.len() != 5 || !offset[1..].chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let millis: i64 = millis.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

fn parse_iso_date(value: &str) -> Option<DateTime<Utc>> {
    if value.len() < 19 || value.as_bytes().get(10) != Some(&b'T') {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = value.strip_suffix('Z').unwrap_or(value);
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// 发往接口时统一使用 RFC 3339（毫秒精度，`Z` 结尾）
pub fn to_wire(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 把 .NET 风格模式串转换为 chrono 格式串
pub fn to_chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let token = match (c, run) {
            ('y', 4) => Some("%Y"),
            ('y', 2) => Some("%y"),
            ('M', 1) => Some("%-m"),
            ('M', 2) => Some("%m"),
            ('M', 3) => Some("%b"),
            ('M', 4) => Some("%B"),
            ('d', 1) => Some("%-d"),
            ('d', 2) => Some("%d"),
            ('d', 3) => Some("%a"),
            ('d', 4) => Some("%A"),
            ('H', 1) => Some("%-H"),
            ('H', 2) => Some("%H"),
            ('h', 1) => Some("%-I"),
            ('h', 2) => Some("%I"),
            ('m', 1) => Some("%-M"),
            ('m', 2) => Some("%M"),
            ('s', 1) => Some("%-S"),
            ('s', 2) => Some("%S"),
            ('t', 1) | ('t', 2) => Some("%p"),
            _ => None,
        };

        match token {
            Some(token) => out.push_str(token),
            None => {
                for _ in 0..run {
                    if c == '%' {
                        out.push_str("%%");
                    } else {
                        out.push(c);
                    }
                }
            }
        }
        i += run;
    }

    out
}

pub fn format_date(value: &DateTime<Utc>, pattern: &str) -> String {
    value.format(&to_chrono_format(pattern)).to_string()
}

/// 按模式串解析表单文本；模式只含日期部分时取当日零点
pub fn parse_date(text: &str, pattern: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let format = to_chrono_format(pattern);
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, &format) {
        return Some(Utc.from_utc_datetime(&dt));
    }

    NaiveDate::parse_from_str(text, &format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}
