//! 字段校验器
//!
//! 校验在序列化之后单独进行。每个字段的全部校验器都会执行，
//! 只保留第一条非空消息；所有字段都会被检查。

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use dashboard_core::dates;
use dashboard_domain::{AttributeMap, AttributeValue};
use dashboard_errors::FieldErrors;
use regex::Regex;

pub trait FieldValidator: Send + Sync + Debug {
    /// 返回错误消息；通过时返回 `None`
    fn validate(&self, value: &AttributeValue) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct RequiredFieldValidator {
    message: String,
}

impl RequiredFieldValidator {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl FieldValidator for RequiredFieldValidator {
    fn validate(&self, value: &AttributeValue) -> Option<String> {
        value.is_empty().then(|| self.message.clone())
    }
}

/// 最大长度（按字符计）；空值通过
#[derive(Debug, Clone)]
pub struct LengthFieldValidator {
    max: usize,
    message: String,
}

impl LengthFieldValidator {
    pub fn new<S: Into<String>>(max: usize, message: S) -> Self {
        Self {
            max,
            message: message.into(),
        }
    }
}

impl FieldValidator for LengthFieldValidator {
    fn validate(&self, value: &AttributeValue) -> Option<String> {
        (value.to_plain_string().chars().count() > self.max).then(|| self.message.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeBounds {
    Numeric { min: f64, max: f64 },
    Date { min: DateTime<Utc>, max: DateTime<Utc> },
}

/// 闭区间范围校验；缺失或无法解析的值视为越界
#[derive(Debug, Clone)]
pub struct RangeFieldValidator {
    bounds: RangeBounds,
    message: String,
}

impl RangeFieldValidator {
    pub fn numeric<S: Into<String>>(min: f64, max: f64, message: S) -> Self {
        Self {
            bounds: RangeBounds::Numeric { min, max },
            message: message.into(),
        }
    }

    pub fn date<S: Into<String>>(min: DateTime<Utc>, max: DateTime<Utc>, message: S) -> Self {
        Self {
            bounds: RangeBounds::Date { min, max },
            message: message.into(),
        }
    }

    fn in_range(&self, value: &AttributeValue) -> bool {
        match self.bounds {
            RangeBounds::Numeric { min, max } => value
                .as_f64()
                .map(|v| v >= min && v <= max)
                .unwrap_or(false),
            RangeBounds::Date { min, max } => {
                let date = match value {
                    AttributeValue::Date(date) => Some(*date),
                    AttributeValue::Text(text) => dates::parse_wire_date(text),
                    _ => None,
                };
                date.map(|d| d >= min && d <= max).unwrap_or(false)
            }
        }
    }
}

impl FieldValidator for RangeFieldValidator {
    fn validate(&self, value: &AttributeValue) -> Option<String> {
        (!self.in_range(value)).then(|| self.message.clone())
    }
}

/// 正则校验；空值通过，必填由 [`RequiredFieldValidator`] 负责
#[derive(Debug, Clone)]
pub struct RegexFieldValidator {
    pattern: Regex,
    message: String,
}

impl RegexFieldValidator {
    pub fn new<S: Into<String>>(pattern: &str, message: S) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: message.into(),
        })
    }

    pub fn from_regex<S: Into<String>>(pattern: Regex, message: S) -> Self {
        Self {
            pattern,
            message: message.into(),
        }
    }
}

impl FieldValidator for RegexFieldValidator {
    fn validate(&self, value: &AttributeValue) -> Option<String> {
        if value.is_empty() {
            return None;
        }
        (!self.pattern.is_match(&value.to_plain_string())).then(|| self.message.clone())
    }
}

/// 取值必须属于固定集合（区分大小写）
#[derive(Debug, Clone)]
pub struct EnumFieldValidator {
    values: Vec<String>,
    message: String,
}

impl EnumFieldValidator {
    pub fn new<I, V, S>(values: I, message: S) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl FieldValidator for EnumFieldValidator {
    fn validate(&self, value: &AttributeValue) -> Option<String> {
        let text = value.to_plain_string();
        (!self.values.iter().any(|allowed| *allowed == text)).then(|| self.message.clone())
    }
}

/// 文本必须是合法JSON；空值通过
#[derive(Debug, Clone)]
pub struct JsonFieldValidator {
    message: String,
}

impl JsonFieldValidator {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl FieldValidator for JsonFieldValidator {
    fn validate(&self, value: &AttributeValue) -> Option<String> {
        match value {
            AttributeValue::Text(text) if !text.trim().is_empty() => {
                serde_json::from_str::<serde_json::Value>(text)
                    .err()
                    .map(|_| self.message.clone())
            }
            _ => None,
        }
    }
}

/// 属性名 -> 校验器链
#[derive(Debug, Default)]
pub struct FormValidator {
    fields: BTreeMap<String, Vec<Box<dyn FieldValidator>>>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: FieldValidator + 'static>(mut self, name: &str, validator: V) -> Self {
        self.fields
            .entry(name.to_string())
            .or_default()
            .push(Box::new(validator));
        self
    }

    pub fn validators(&self, name: &str) -> &[Box<dyn FieldValidator>] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 检查所有声明了校验器的属性；缺失的属性按 Null 处理
    pub fn validate(&self, attributes: &AttributeMap) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (name, validators) in &self.fields {
            let value = attributes.get(name).cloned().unwrap_or_default();
            let first = validators
                .iter()
                .map(|validator| validator.validate(&value))
                .fold(None, |first: Option<String>, message| {
                    first.or(message.filter(|m| !m.is_empty()))
                });
            if let Some(message) = first {
                errors.insert(name.clone(), message);
            }
        }
        errors
    }
}
