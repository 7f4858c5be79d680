//! 字段序列化器
//!
//! 在记录属性值与表单控件之间双向转换。每个序列化器无状态，
//! 由 [`FormSerializer`] 按属性名分派。

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use dashboard_core::dates;
use dashboard_domain::{AttributeMap, AttributeValue};
use serde_json::Value;

use crate::control::{read_controls, write_controls, ControlValue, FieldControl, Form};

/// 队列名称字段中表示“全部队列”的标记
pub const ALL_QUEUES: &str = "*";

pub trait FieldSerializer: Send + Sync + Debug {
    fn serialize(&self, controls: &[FieldControl]) -> AttributeValue;

    fn deserialize(&self, value: &AttributeValue, controls: &mut [FieldControl]);
}

/// 默认序列化器：按文本读写，Null 与 NaN 写为空字符串
#[derive(Debug, Clone, Copy, Default)]
pub struct StringFieldSerializer;

impl FieldSerializer for StringFieldSerializer {
    fn serialize(&self, controls: &[FieldControl]) -> AttributeValue {
        match read_controls(controls) {
            ControlValue::Missing => AttributeValue::Null,
            ControlValue::Single(value) => AttributeValue::Text(value),
            ControlValue::Flag(flag) => AttributeValue::Bool(flag),
            ControlValue::Many(values) => {
                AttributeValue::Json(Value::Array(values.into_iter().map(Value::String).collect()))
            }
        }
    }

    fn deserialize(&self, value: &AttributeValue, controls: &mut [FieldControl]) {
        let control_value = match value {
            AttributeValue::Bool(flag) => ControlValue::Flag(*flag),
            AttributeValue::Json(Value::Array(items)) => ControlValue::Many(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            other => ControlValue::Single(other.to_plain_string()),
        };
        write_controls(controls, &control_value);
    }
}

/// 布尔序列化器：TRUE/YES/1 与 FALSE/NO/0（不区分大小写）先归一为布尔值
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanFieldSerializer;

impl BooleanFieldSerializer {
    pub fn parse(text: &str) -> Option<bool> {
        match text.trim().to_ascii_uppercase().as_str() {
            "TRUE" | "YES" | "1" => Some(true),
            "FALSE" | "NO" | "0" => Some(false),
            _ => None,
        }
    }

    fn normalize(value: &AttributeValue) -> Option<bool> {
        match value {
            AttributeValue::Bool(flag) => Some(*flag),
            AttributeValue::Int(i) => Some(*i != 0),
            AttributeValue::Text(text) => Self::parse(text),
            _ => None,
        }
    }
}

impl FieldSerializer for BooleanFieldSerializer {
    fn serialize(&self, controls: &[FieldControl]) -> AttributeValue {
        match read_controls(controls) {
            ControlValue::Flag(flag) => AttributeValue::Bool(flag),
            ControlValue::Single(text) => Self::parse(&text)
                .map(AttributeValue::Bool)
                .unwrap_or(AttributeValue::Null),
            _ => AttributeValue::Null,
        }
    }

    fn deserialize(&self, value: &AttributeValue, controls: &mut [FieldControl]) {
        let control_value = match Self::normalize(value) {
            Some(flag) if controls.len() == 1 && controls[0].kind.is_checkable() => {
                ControlValue::Flag(flag)
            }
            Some(flag) => ControlValue::Single(flag.to_string()),
            None if controls.len() == 1 && controls[0].kind.is_checkable() => {
                ControlValue::Flag(false)
            }
            None => ControlValue::Single(String::new()),
        };
        write_controls(controls, &control_value);
    }
}

/// 日期序列化器，按 .NET 风格模式串格式化
#[derive(Debug, Clone)]
pub struct DateFieldSerializer {
    pattern: String,
}

impl Default for DateFieldSerializer {
    fn default() -> Self {
        Self::new(dates::DEFAULT_PATTERN)
    }
}

impl DateFieldSerializer {
    pub fn new<S: Into<String>>(pattern: S) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl FieldSerializer for DateFieldSerializer {
    /// 无法解析的文本原样保留，交给校验器报告
    fn serialize(&self, controls: &[FieldControl]) -> AttributeValue {
        let text = read_controls(controls).as_text();
        if text.trim().is_empty() {
            return AttributeValue::Null;
        }
        match dates::parse_date(&text, &self.pattern) {
            Some(date) => AttributeValue::Date(date),
            None => AttributeValue::Text(text),
        }
    }

    fn deserialize(&self, value: &AttributeValue, controls: &mut [FieldControl]) {
        let date = match value {
            AttributeValue::Date(date) => Some(*date),
            AttributeValue::Text(text) => dates::parse_wire_date(text),
            _ => None,
        };
        let text = match (date, value) {
            (Some(date), _) => dates::format_date(&date, &self.pattern),
            (None, AttributeValue::Text(text)) => text.clone(),
            (None, _) => String::new(),
        };
        write_controls(controls, &ControlValue::Single(text));
    }
}

/// 浮点序列化器，固定小数位数
#[derive(Debug, Clone, Copy)]
pub struct DoubleFieldSerializer {
    digits: usize,
}

impl Default for DoubleFieldSerializer {
    fn default() -> Self {
        Self::new(2)
    }
}

impl DoubleFieldSerializer {
    pub fn new(digits: usize) -> Self {
        Self { digits }
    }
}

impl FieldSerializer for DoubleFieldSerializer {
    fn serialize(&self, controls: &[FieldControl]) -> AttributeValue {
        let text = read_controls(controls).as_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return AttributeValue::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => AttributeValue::Double(value),
            _ => AttributeValue::Text(text),
        }
    }

    fn deserialize(&self, value: &AttributeValue, controls: &mut [FieldControl]) {
        let text = match value {
            AttributeValue::Text(text) if text.trim().parse::<f64>().is_err() => text.clone(),
            other => other
                .as_f64()
                .filter(|v| v.is_finite())
                .map(|v| format!("{:.*}", self.digits, v))
                .unwrap_or_default(),
        };
        write_controls(controls, &ControlValue::Single(text));
    }
}

/// 整数序列化器，向下取整
#[derive(Debug, Clone, Copy, Default)]
pub struct IntFieldSerializer;

impl FieldSerializer for IntFieldSerializer {
    fn serialize(&self, controls: &[FieldControl]) -> AttributeValue {
        let text = read_controls(controls).as_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return AttributeValue::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => AttributeValue::Int(value.floor() as i64),
            _ => AttributeValue::Text(text),
        }
    }

    fn deserialize(&self, value: &AttributeValue, controls: &mut [FieldControl]) {
        let text = match value {
            AttributeValue::Text(text) if text.trim().parse::<f64>().is_err() => text.clone(),
            AttributeValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(|v| (v.floor() as i64).to_string())
                .unwrap_or_default(),
            other => other.as_i64().map(|v| v.to_string()).unwrap_or_default(),
        };
        write_controls(controls, &ControlValue::Single(text));
    }
}

/// Worker 监听的队列列表：字段中每行一个队列名，`*` 表示全部队列，对应空字段
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueNamesFieldSerializer;

impl QueueNamesFieldSerializer {
    fn lines(text: &str) -> Vec<&str> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl FieldSerializer for QueueNamesFieldSerializer {
    fn serialize(&self, controls: &[FieldControl]) -> AttributeValue {
        let text = read_controls(controls).as_text();
        let names = Self::lines(&text);
        if names.is_empty() {
            AttributeValue::text(ALL_QUEUES)
        } else {
            AttributeValue::Text(names.join("\n"))
        }
    }

    fn deserialize(&self, value: &AttributeValue, controls: &mut [FieldControl]) {
        let text = match value {
            AttributeValue::Json(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            other => {
                let raw = other.to_plain_string();
                if raw.trim() == ALL_QUEUES {
                    String::new()
                } else {
                    Self::lines(&raw).join("\n")
                }
            }
        };
        write_controls(controls, &ControlValue::Single(text));
    }
}

/// 整张表单的序列化：按属性名分派，未登记的属性使用默认序列化器
#[derive(Debug, Clone, Default)]
pub struct FormSerializer {
    fields: HashMap<String, Arc<dyn FieldSerializer>>,
}

impl FormSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<S: FieldSerializer + 'static>(mut self, name: &str, serializer: S) -> Self {
        self.fields.insert(name.to_string(), Arc::new(serializer));
        self
    }

    pub fn field(&self, name: &str) -> &dyn FieldSerializer {
        static DEFAULT: StringFieldSerializer = StringFieldSerializer;
        self.fields
            .get(name)
            .map(|serializer| serializer.as_ref())
            .unwrap_or(&DEFAULT)
    }

    pub fn serialize(&self, form: &Form) -> AttributeMap {
        form.field_names()
            .map(|name| (name.to_string(), self.field(name).serialize(form.controls(name))))
            .collect()
    }

    /// 缺失的属性按 Null 写入，控件显示为各类型的空值
    pub fn deserialize(&self, attributes: &AttributeMap, form: &mut Form) {
        let names: Vec<String> = form.field_names().map(str::to_string).collect();
        for name in names {
            let value = attributes.get(&name).cloned().unwrap_or_default();
            self.field(&name).deserialize(&value, form.controls_mut(&name));
        }
    }
}
