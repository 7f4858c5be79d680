use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dashboard_core::dates;
use dashboard_errors::{DashboardError, DashboardResult};
use serde_json::{Map, Number, Value};

/// 存放任意JSON文档的属性名，编辑时以两空格缩进的文本呈现
pub const DATA_ATTRIBUTE: &str = "Data";
pub const ID_ATTRIBUTE: &str = "Id";
pub const SIGNAL_ATTRIBUTE: &str = "Signal";

/// 记录属性值
///
/// 接口中的日期字符串在入库时转换为 `Date`，数组和对象保留为 `Json`。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Date(DateTime<Utc>),
    Json(Value),
}

pub type AttributeMap = BTreeMap<String, AttributeValue>;

static NULL: AttributeValue = AttributeValue::Null;

impl AttributeValue {
    pub fn text<S: Into<String>>(value: S) -> Self {
        AttributeValue::Text(value.into())
    }

    /// 从接口JSON值转换；符合日期形态的字符串转为 `Date`
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Int(i),
                None => AttributeValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => match dates::parse_wire_date(s) {
                Some(date) => AttributeValue::Date(date),
                None => AttributeValue::Text(s.clone()),
            },
            Value::Array(_) | Value::Object(_) => AttributeValue::Json(value.clone()),
        }
    }

    pub fn to_wire(&self) -> Value {
        match self {
            AttributeValue::Null => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Int(i) => Value::Number((*i).into()),
            AttributeValue::Double(d) => Number::from_f64(*d).map(Value::Number).unwrap_or(Value::Null),
            AttributeValue::Text(s) => Value::String(s.clone()),
            AttributeValue::Date(d) => Value::String(dates::to_wire(d)),
            AttributeValue::Json(v) => v.clone(),
        }
    }

    /// Null、NaN 与空白文本视为空
    pub fn is_empty(&self) -> bool {
        match self {
            AttributeValue::Null => true,
            AttributeValue::Double(d) => d.is_nan(),
            AttributeValue::Text(s) => s.trim().is_empty(),
            AttributeValue::Json(v) => v.is_null(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            AttributeValue::Double(d) if d.is_finite() => Some(d.floor() as i64),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Double(d) if !d.is_nan() => Some(*d),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            AttributeValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// 不依赖表单格式的纯文本形式，用于列表展示与校验
    pub fn to_plain_string(&self) -> String {
        match self {
            AttributeValue::Null => String::new(),
            AttributeValue::Bool(b) => b.to_string(),
            AttributeValue::Int(i) => i.to_string(),
            AttributeValue::Double(d) if d.is_nan() => String::new(),
            AttributeValue::Double(d) => d.to_string(),
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::Date(d) => dates::to_wire(d),
            AttributeValue::Json(v) => v.to_string(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttributeValue::Date(value)
    }
}

/// 信号提交的两阶段状态：先乐观写入，成功后确认，失败时回滚到 `previous`
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSignal {
    pub requested: String,
    pub previous: AttributeValue,
}

/// 一条持久化实体（任务、计划、Worker、历史记录）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    attributes: AttributeMap,
    /// 仅用于界面，不会发送到服务端
    pub selected: bool,
    pub details_loaded: bool,
    pending_signal: Option<PendingSignal>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: i64) -> Self {
        let mut record = Self::default();
        record.set(ID_ATTRIBUTE, AttributeValue::Int(id));
        record
    }

    pub fn from_attributes(attributes: AttributeMap) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    /// 解析接口返回的单条记录
    pub fn from_wire(value: &Value) -> DashboardResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            DashboardError::Serialization(format!("记录必须是JSON对象: {value}"))
        })?;

        let attributes = object
            .iter()
            .map(|(key, value)| (key.clone(), ingest_attribute(key, value)))
            .collect();

        Ok(Self::from_attributes(attributes))
    }

    pub fn to_wire(&self) -> Value {
        attributes_to_wire(&self.attributes)
    }

    pub fn id(&self) -> i64 {
        self.get(ID_ATTRIBUTE).as_i64().unwrap_or(0)
    }

    pub fn is_new(&self) -> bool {
        self.id() == 0
    }

    pub fn get(&self, name: &str) -> &AttributeValue {
        self.attributes.get(name).unwrap_or(&NULL)
    }

    pub fn set<V: Into<AttributeValue>>(&mut self, name: &str, value: V) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// 合并详情接口返回的属性，已有同名属性被覆盖
    pub fn merge(&mut self, attributes: AttributeMap) {
        self.attributes.extend(attributes);
    }

    pub fn pending_signal(&self) -> Option<&PendingSignal> {
        self.pending_signal.as_ref()
    }

    /// 第一阶段：立即在内存中写入新信号，保留原值以便回滚
    pub fn begin_signal(&mut self, signal: &str) {
        let previous = match self.pending_signal.take() {
            Some(pending) => pending.previous,
            None => self.get(SIGNAL_ATTRIBUTE).clone(),
        };
        self.set(SIGNAL_ATTRIBUTE, signal);
        self.pending_signal = Some(PendingSignal {
            requested: signal.to_string(),
            previous,
        });
    }

    pub fn commit_signal(&mut self) {
        self.pending_signal = None;
    }

    pub fn rollback_signal(&mut self) {
        if let Some(pending) = self.pending_signal.take() {
            self.attributes
                .insert(SIGNAL_ATTRIBUTE.to_string(), pending.previous);
        }
    }
}

fn ingest_attribute(key: &str, value: &Value) -> AttributeValue {
    if key != DATA_ATTRIBUTE {
        return AttributeValue::from_wire(value);
    }

    match value {
        Value::Null => AttributeValue::Null,
        Value::String(raw) if raw.trim().is_empty() => AttributeValue::Text(String::new()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(document) => AttributeValue::Text(pretty(&document, raw)),
            Err(_) => AttributeValue::Text(raw.clone()),
        },
        document => AttributeValue::Text(pretty(document, &document.to_string())),
    }
}

fn pretty(document: &Value, fallback: &str) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| fallback.to_string())
}

/// 将属性集合转换为接口请求体
pub fn attributes_to_wire(attributes: &AttributeMap) -> Value {
    let mut object = Map::new();
    for (key, value) in attributes {
        let wire = if key == DATA_ATTRIBUTE {
            match value {
                AttributeValue::Text(text) if !text.trim().is_empty() => {
                    match serde_json::from_str::<Value>(text) {
                        Ok(document) => Value::String(document.to_string()),
                        Err(_) => Value::String(text.clone()),
                    }
                }
                AttributeValue::Json(document) => Value::String(document.to_string()),
                other => other.to_wire(),
            }
        } else {
            value.to_wire()
        };
        object.insert(key.clone(), wire);
    }
    Value::Object(object)
}
