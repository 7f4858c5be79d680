//! 表单控件模型
//!
//! 按属性名分组的控件集合。一个属性可以对应单个控件、单个复选框、
//! 复选框组或单选组；[`read_controls`] / [`write_controls`] 统一处理这些情况。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    Text,
    TextArea,
    Select,
    Hidden,
    Checkbox,
    Radio,
}

impl ControlKind {
    pub fn is_checkable(&self) -> bool {
        matches!(self, ControlKind::Checkbox | ControlKind::Radio)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldControl {
    pub kind: ControlKind,
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
}

impl FieldControl {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            value: String::new(),
            checked: false,
            disabled: false,
        }
    }

    pub fn text() -> Self {
        Self::new(ControlKind::Text)
    }

    pub fn textarea() -> Self {
        Self::new(ControlKind::TextArea)
    }

    pub fn hidden() -> Self {
        Self::new(ControlKind::Hidden)
    }

    pub fn select() -> Self {
        Self::new(ControlKind::Select)
    }

    pub fn checkbox<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            ..Self::new(ControlKind::Checkbox)
        }
    }

    pub fn radio<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            ..Self::new(ControlKind::Radio)
        }
    }

    pub fn with_value<S: Into<String>>(mut self, value: S) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

/// 从一组控件读出的原始值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlValue {
    Missing,
    Single(String),
    Flag(bool),
    Many(Vec<String>),
}

impl ControlValue {
    /// 文本形式；复选框组按换行拼接
    pub fn as_text(&self) -> String {
        match self {
            ControlValue::Missing => String::new(),
            ControlValue::Single(value) => value.clone(),
            ControlValue::Flag(flag) => flag.to_string(),
            ControlValue::Many(values) => values.join("\n"),
        }
    }
}

pub fn read_controls(controls: &[FieldControl]) -> ControlValue {
    let Some(first) = controls.first() else {
        return ControlValue::Missing;
    };

    match first.kind {
        ControlKind::Checkbox if controls.len() == 1 => ControlValue::Flag(first.checked),
        ControlKind::Checkbox => ControlValue::Many(
            controls
                .iter()
                .filter(|control| control.checked)
                .map(|control| control.value.clone())
                .collect(),
        ),
        ControlKind::Radio => ControlValue::Single(
            controls
                .iter()
                .find(|control| control.checked)
                .map(|control| control.value.clone())
                .unwrap_or_default(),
        ),
        _ => ControlValue::Single(first.value.clone()),
    }
}

pub fn write_controls(controls: &mut [FieldControl], value: &ControlValue) {
    let Some(kind) = controls.first().map(|control| control.kind) else {
        return;
    };

    match (kind, value) {
        (ControlKind::Checkbox, ControlValue::Flag(flag)) if controls.len() == 1 => {
            controls[0].checked = *flag;
        }
        (ControlKind::Checkbox, ControlValue::Many(values)) => {
            for control in controls.iter_mut() {
                control.checked = values.contains(&control.value);
            }
        }
        (ControlKind::Checkbox, other) if controls.len() == 1 => {
            controls[0].checked = is_truthy(&other.as_text());
        }
        (ControlKind::Checkbox | ControlKind::Radio, other) => {
            let text = other.as_text();
            let selected: Vec<&str> = text.lines().collect();
            for control in controls.iter_mut() {
                control.checked = if kind == ControlKind::Radio {
                    control.value == text
                } else {
                    selected.contains(&control.value.as_str())
                };
            }
        }
        (_, other) => {
            let text = other.as_text();
            for control in controls.iter_mut() {
                control.value = text.clone();
            }
        }
    }
}

fn is_truthy(text: &str) -> bool {
    matches!(text.trim().to_ascii_uppercase().as_str(), "TRUE" | "YES" | "1")
}

/// 按属性名分组的表单控件，保持声明顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    fields: BTreeMap<String, Vec<FieldControl>>,
    order: Vec<String>,
    disabled: bool,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_control(mut self, name: &str, control: FieldControl) -> Self {
        self.add_control(name, control);
        self
    }

    pub fn add_control(&mut self, name: &str, control: FieldControl) {
        if !self.fields.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.fields.entry(name.to_string()).or_default().push(control);
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn controls(&self, name: &str) -> &[FieldControl] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn controls_mut(&mut self, name: &str) -> &mut [FieldControl] {
        self.fields
            .get_mut(name)
            .map(Vec::as_mut_slice)
            .unwrap_or(&mut [])
    }

    pub fn read(&self, name: &str) -> ControlValue {
        read_controls(self.controls(name))
    }

    /// 模拟用户输入：写入单个控件的文本或勾选单选/复选项
    pub fn set_value(&mut self, name: &str, value: &str) {
        write_controls(self.controls_mut(name), &ControlValue::Single(value.to_string()));
    }

    pub fn set_checked(&mut self, name: &str, checked: bool) {
        write_controls(self.controls_mut(name), &ControlValue::Flag(checked));
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// 提交期间禁用全部控件
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        for control in self.fields.values_mut().flatten() {
            control.disabled = disabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_checkbox_reads_checked_state() {
        let mut form = Form::new().with_control("Enabled", FieldControl::checkbox("true"));
        assert_eq!(form.read("Enabled"), ControlValue::Flag(false));

        form.set_checked("Enabled", true);
        assert_eq!(form.read("Enabled"), ControlValue::Flag(true));

        form.set_value("Enabled", "no");
        assert_eq!(form.read("Enabled"), ControlValue::Flag(false));
    }

    #[test]
    fn test_checkbox_group() {
        let mut controls = vec![
            FieldControl::checkbox("a"),
            FieldControl::checkbox("b"),
            FieldControl::checkbox("c"),
        ];
        write_controls(
            &mut controls,
            &ControlValue::Many(vec!["a".to_string(), "c".to_string()]),
        );
        assert_eq!(
            read_controls(&controls),
            ControlValue::Many(vec!["a".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_radio_group() {
        let mut form = Form::new()
            .with_control("Signal", FieldControl::radio("Start"))
            .with_control("Signal", FieldControl::radio("Stop"));
        assert_eq!(form.read("Signal"), ControlValue::Single(String::new()));

        form.set_value("Signal", "Stop");
        assert_eq!(form.read("Signal"), ControlValue::Single("Stop".to_string()));
        assert!(!form.controls("Signal")[0].checked);
    }

    #[test]
    fn test_missing_field() {
        let mut form = Form::new();
        assert_eq!(form.read("Nope"), ControlValue::Missing);
        form.set_value("Nope", "x");
        assert!(form.controls("Nope").is_empty());
    }

    #[test]
    fn test_disable_all_controls() {
        let mut form = Form::new()
            .with_control("Name", FieldControl::text())
            .with_control("Data", FieldControl::textarea());
        form.set_disabled(true);
        assert!(form.is_disabled());
        assert!(form.controls("Name")[0].disabled);
        assert!(form.controls("Data")[0].disabled);
        assert_eq!(form.field_names().collect::<Vec<_>>(), vec!["Name", "Data"]);
    }
}
