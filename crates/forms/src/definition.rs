//! 各区域的表单定义：布局、序列化器与校验器
//!
//! 定义在进程内只构建一次，之后只读共享。

use std::sync::{Arc, OnceLock};

use dashboard_core::dates;
use dashboard_domain::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::control::{ControlKind, FieldControl, Form};
use crate::serializer::{
    BooleanFieldSerializer, DateFieldSerializer, FormSerializer, IntFieldSerializer,
    QueueNamesFieldSerializer,
};
use crate::validator::{
    EnumFieldValidator, FieldValidator, FormValidator, JsonFieldValidator, LengthFieldValidator,
    RangeFieldValidator, RegexFieldValidator, RequiredFieldValidator,
};

pub const REPEAT_TYPES: [&str; 5] = ["Seconds", "Minutes", "Hours", "Days", "Weeks"];
pub const STARTUP_TYPES: [&str; 2] = ["Automatic", "Manual"];
pub const WORKER_SIGNALS: [&str; 3] = ["Start", "Stop", "Refresh"];
pub const WORKING_SIGNALS: [&str; 1] = ["Cancel"];

const NAME_PATTERN: &str = r"^[A-Za-z0-9_\-\.]+$";

/// 影响表单显示的选项，来自 `display` 配置段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormStyle {
    pub date_pattern: String,
}

impl Default for FormStyle {
    fn default() -> Self {
        Self {
            date_pattern: dates::DEFAULT_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormKind {
    QueueJob,
    Schedule,
    ScheduledJob,
    Worker,
    WorkerSignal,
    WorkingSignal,
}

/// 表单中一个字段的布局
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ControlKind,
    /// 单选组的可选值或下拉框选项
    pub options: Vec<&'static str>,
}

impl FieldSpec {
    fn new(name: &'static str, label: &'static str, kind: ControlKind) -> Self {
        Self {
            name,
            label,
            kind,
            options: Vec::new(),
        }
    }

    fn with_options(mut self, options: &[&'static str]) -> Self {
        self.options = options.to_vec();
        self
    }

    fn controls(&self) -> Vec<FieldControl> {
        match self.kind {
            ControlKind::Radio => self.options.iter().map(|o| FieldControl::radio(*o)).collect(),
            ControlKind::Checkbox if !self.options.is_empty() => {
                self.options.iter().map(|o| FieldControl::checkbox(*o)).collect()
            }
            ControlKind::Checkbox => vec![FieldControl::checkbox("true")],
            other => vec![FieldControl::new(other)],
        }
    }
}

#[derive(Debug)]
pub struct FormDefinition {
    pub kind: FormKind,
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
    pub serializer: FormSerializer,
    pub validator: FormValidator,
}

impl FormDefinition {
    /// 按布局生成一张空表单
    pub fn build_form(&self) -> Form {
        let mut form = Form::new();
        for field in &self.fields {
            for control in field.controls() {
                form.add_control(field.name, control);
            }
        }
        form
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn build(kind: FormKind, style: &FormStyle) -> Self {
        match kind {
            FormKind::QueueJob => queue_job(),
            FormKind::Schedule => schedule(style),
            FormKind::ScheduledJob => scheduled_job(),
            FormKind::Worker => worker(),
            FormKind::WorkerSignal => signal(FormKind::WorkerSignal, "Signal Worker", &WORKER_SIGNALS),
            FormKind::WorkingSignal => {
                signal(FormKind::WorkingSignal, "Signal Job", &WORKING_SIGNALS)
            }
        }
    }
}

/// 全部表单定义
#[derive(Debug, Clone)]
pub struct FormCatalog {
    style: FormStyle,
    queue_job: Arc<FormDefinition>,
    schedule: Arc<FormDefinition>,
    scheduled_job: Arc<FormDefinition>,
    worker: Arc<FormDefinition>,
    worker_signal: Arc<FormDefinition>,
    working_signal: Arc<FormDefinition>,
}

impl FormCatalog {
    pub fn new(style: FormStyle) -> Self {
        let build = |kind| Arc::new(FormDefinition::build(kind, &style));
        Self {
            queue_job: build(FormKind::QueueJob),
            schedule: build(FormKind::Schedule),
            scheduled_job: build(FormKind::ScheduledJob),
            worker: build(FormKind::Worker),
            worker_signal: build(FormKind::WorkerSignal),
            working_signal: build(FormKind::WorkingSignal),
            style,
        }
    }

    /// 默认显示选项下的共享目录
    pub fn standard() -> Arc<FormCatalog> {
        static CATALOG: OnceLock<Arc<FormCatalog>> = OnceLock::new();
        Arc::clone(CATALOG.get_or_init(|| Arc::new(FormCatalog::new(FormStyle::default()))))
    }

    pub fn style(&self) -> &FormStyle {
        &self.style
    }

    pub fn get(&self, kind: FormKind) -> Arc<FormDefinition> {
        let definition = match kind {
            FormKind::QueueJob => &self.queue_job,
            FormKind::Schedule => &self.schedule,
            FormKind::ScheduledJob => &self.scheduled_job,
            FormKind::Worker => &self.worker,
            FormKind::WorkerSignal => &self.worker_signal,
            FormKind::WorkingSignal => &self.working_signal,
        };
        Arc::clone(definition)
    }
}

fn name_validator(message: &str) -> RegexFieldValidator {
    static NAME: OnceLock<regex::Regex> = OnceLock::new();
    let pattern =
        NAME.get_or_init(|| regex::Regex::new(NAME_PATTERN).expect("valid queue name pattern"));
    RegexFieldValidator::from_regex(pattern.clone(), message)
}

fn queue_job() -> FormDefinition {
    FormDefinition {
        kind: FormKind::QueueJob,
        title: "Queued Job",
        fields: vec![
            FieldSpec::new("Id", "", ControlKind::Hidden),
            FieldSpec::new("QueueName", "Queue", ControlKind::Text),
            FieldSpec::new("JobName", "Name", ControlKind::Text),
            FieldSpec::new("JobType", "Type", ControlKind::Text),
            FieldSpec::new("Data", "Data", ControlKind::TextArea),
        ],
        serializer: FormSerializer::new().with("Id", IntFieldSerializer),
        validator: FormValidator::new()
            .with("QueueName", RequiredFieldValidator::new("Queue is required."))
            .with("QueueName", LengthFieldValidator::new(24, "Queue must be 24 characters or less."))
            .with("QueueName", name_validator("Queue may only contain letters, numbers, '.', '-' and '_'."))
            .with("JobName", LengthFieldValidator::new(100, "Name must be 100 characters or less."))
            .with("JobType", RequiredFieldValidator::new("Type is required."))
            .with("JobType", LengthFieldValidator::new(255, "Type must be 255 characters or less."))
            .with("Data", JsonFieldValidator::new("Data must be valid JSON.")),
    }
}

fn schedule(style: &FormStyle) -> FormDefinition {
    let repeat_types = REPEAT_TYPES.join(", ");
    FormDefinition {
        kind: FormKind::Schedule,
        title: "Schedule",
        fields: vec![
            FieldSpec::new("Id", "", ControlKind::Hidden),
            FieldSpec::new("Name", "Name", ControlKind::Text),
            FieldSpec::new("QueueName", "Queue", ControlKind::Text),
            FieldSpec::new("StartOn", "Start on", ControlKind::Text),
            FieldSpec::new("EndOn", "End on", ControlKind::Text),
            FieldSpec::new("RepeatType", "Repeat", ControlKind::Select)
                .with_options(&REPEAT_TYPES),
            FieldSpec::new("RepeatValue", "Every", ControlKind::Text),
            FieldSpec::new("Enabled", "Enabled", ControlKind::Checkbox),
        ],
        serializer: FormSerializer::new()
            .with("Id", IntFieldSerializer)
            .with("StartOn", DateFieldSerializer::new(style.date_pattern.clone()))
            .with("EndOn", DateFieldSerializer::new(style.date_pattern.clone()))
            .with("RepeatValue", IntFieldSerializer)
            .with("Enabled", BooleanFieldSerializer),
        validator: FormValidator::new()
            .with("Name", RequiredFieldValidator::new("Name is required."))
            .with("Name", LengthFieldValidator::new(50, "Name must be 50 characters or less."))
            .with("QueueName", RequiredFieldValidator::new("Queue is required."))
            .with("QueueName", LengthFieldValidator::new(24, "Queue must be 24 characters or less."))
            .with("QueueName", name_validator("Queue may only contain letters, numbers, '.', '-' and '_'."))
            .with("StartOn", RequiredFieldValidator::new("Start on must be a valid date."))
            .with("StartOn", date_validator("Start on must be a valid date."))
            .with("EndOn", optional_date_validator("End on must be a valid date."))
            .with(
                "RepeatType",
                EnumFieldValidator::new(
                    REPEAT_TYPES,
                    format!("Repeat must be one of {repeat_types}."),
                ),
            )
            .with(
                "RepeatValue",
                RangeFieldValidator::numeric(
                    1.0,
                    i32::MAX as f64,
                    "Every must be a number greater than 0.",
                ),
            ),
    }
}

fn scheduled_job() -> FormDefinition {
    FormDefinition {
        kind: FormKind::ScheduledJob,
        title: "Scheduled Job",
        fields: vec![
            FieldSpec::new("Id", "", ControlKind::Hidden),
            FieldSpec::new("ScheduleId", "", ControlKind::Hidden),
            FieldSpec::new("Number", "", ControlKind::Hidden),
            FieldSpec::new("JobType", "Type", ControlKind::Text),
            FieldSpec::new("Data", "Data", ControlKind::TextArea),
        ],
        serializer: FormSerializer::new()
            .with("Id", IntFieldSerializer)
            .with("ScheduleId", IntFieldSerializer)
            .with("Number", IntFieldSerializer),
        validator: FormValidator::new()
            .with("ScheduleId", RangeFieldValidator::numeric(1.0, i64::MAX as f64, "Schedule is required."))
            .with("JobType", RequiredFieldValidator::new("Type is required."))
            .with("JobType", LengthFieldValidator::new(255, "Type must be 255 characters or less."))
            .with("Data", JsonFieldValidator::new("Data must be valid JSON.")),
    }
}

fn worker() -> FormDefinition {
    let startup = STARTUP_TYPES.join(", ");
    FormDefinition {
        kind: FormKind::Worker,
        title: "Worker",
        fields: vec![
            FieldSpec::new("Id", "", ControlKind::Hidden),
            FieldSpec::new("Name", "Name", ControlKind::Text),
            FieldSpec::new("MachineName", "Machine name", ControlKind::Text),
            FieldSpec::new("MachineAddress", "Machine address", ControlKind::Text),
            FieldSpec::new("QueueNames", "Queues", ControlKind::TextArea),
            FieldSpec::new("Startup", "Startup", ControlKind::Select).with_options(&STARTUP_TYPES),
        ],
        serializer: FormSerializer::new()
            .with("Id", IntFieldSerializer)
            .with("QueueNames", QueueNamesFieldSerializer),
        validator: FormValidator::new()
            .with("Name", RequiredFieldValidator::new("Name is required."))
            .with("Name", LengthFieldValidator::new(64, "Name must be 64 characters or less."))
            .with("MachineName", RequiredFieldValidator::new("Machine name is required."))
            .with("MachineName", LengthFieldValidator::new(128, "Machine name must be 128 characters or less."))
            .with("MachineAddress", RequiredFieldValidator::new("Machine address is required."))
            .with("MachineAddress", LengthFieldValidator::new(64, "Machine address must be 64 characters or less."))
            .with("QueueNames", RequiredFieldValidator::new("Queues are required."))
            .with("Startup", EnumFieldValidator::new(STARTUP_TYPES, format!("Startup must be one of {startup}."))),
    }
}

fn signal(kind: FormKind, title: &'static str, signals: &[&'static str]) -> FormDefinition {
    FormDefinition {
        kind,
        title,
        fields: vec![
            FieldSpec::new("Id", "", ControlKind::Hidden),
            FieldSpec::new("Signal", "Signal", ControlKind::Radio).with_options(signals),
        ],
        serializer: FormSerializer::new().with("Id", IntFieldSerializer),
        validator: FormValidator::new().with(
            "Signal",
            EnumFieldValidator::new(signals.iter().copied(), "Please choose a signal."),
        ),
    }
}

fn date_validator(message: &str) -> RangeFieldValidator {
    RangeFieldValidator::date(
        chrono::DateTime::<chrono::Utc>::MIN_UTC,
        chrono::DateTime::<chrono::Utc>::MAX_UTC,
        message,
    )
}

/// 可选日期：空值通过，填写了就必须是日期
#[derive(Debug)]
struct OptionalDate(RangeFieldValidator);

impl FieldValidator for OptionalDate {
    fn validate(&self, value: &AttributeValue) -> Option<String> {
        if value.is_empty() {
            None
        } else {
            self.0.validate(value)
        }
    }
}

fn optional_date_validator(message: &str) -> OptionalDate {
    OptionalDate(date_validator(message))
}
