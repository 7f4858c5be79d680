//! 编辑表单会话
//!
//! 状态机：`Editing -> Submitting -> (Closed | EditingWithErrors)`。
//! 提交期间表单整体禁用，同一表单不会有第二个提交在途。

use std::sync::Arc;

use dashboard_domain::record::ID_ATTRIBUTE;
use dashboard_domain::{AttributeMap, AttributeValue, DashboardError, DashboardResult, Record};
use dashboard_errors::FieldErrors;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::control::Form;
use crate::definition::FormDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    Editing,
    Submitting,
    EditingWithErrors,
    Closed,
}

/// 表单内显示的错误：能对应到字段的高亮字段，其余进入摘要列表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors {
    pub fields: FieldErrors,
    pub summary: Vec<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.summary.is_empty()
    }
}

#[derive(Debug)]
pub struct EditForm {
    definition: Arc<FormDefinition>,
    form: Form,
    record_id: i64,
    state: SubmissionState,
    errors: FormErrors,
}

impl EditForm {
    pub fn new(definition: Arc<FormDefinition>, record: &Record) -> Self {
        let mut form = definition.build_form();
        definition.serializer.deserialize(record.attributes(), &mut form);
        Self {
            definition,
            form,
            record_id: record.id(),
            state: SubmissionState::Editing,
            errors: FormErrors::default(),
        }
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    pub fn record_id(&self) -> i64 {
        self.record_id
    }

    pub fn is_new(&self) -> bool {
        self.record_id == 0
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_open(&self) -> bool {
        self.state != SubmissionState::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    /// 序列化整张表单；隐藏的 Id 缺失时补上会话对应的记录编号
    pub fn attributes(&self) -> AttributeMap {
        let mut attributes = self.definition.serializer.serialize(&self.form);
        let id = attributes
            .get(ID_ATTRIBUTE)
            .and_then(AttributeValue::as_i64)
            .unwrap_or(0);
        if id == 0 {
            attributes.insert(ID_ATTRIBUTE.to_string(), AttributeValue::Int(self.record_id));
        }
        attributes
    }

    pub fn validate(&self) -> FieldErrors {
        self.definition.validator.validate(&self.attributes())
    }

    /// 进入提交：本地校验失败时错误留在表单内，不发起网络请求
    pub fn begin_submit(&mut self) -> DashboardResult<AttributeMap> {
        self.ensure_idle()?;

        let attributes = self.attributes();
        let errors = self.definition.validator.validate(&attributes);
        if !errors.is_empty() {
            debug!("{} 表单校验失败: {:?}", self.definition.title, errors);
            self.show_errors(&errors);
            return Err(DashboardError::Validation(errors));
        }

        self.enter_submitting();
        Ok(attributes)
    }

    /// 删除不做字段校验
    pub fn begin_delete(&mut self) -> DashboardResult<()> {
        self.ensure_idle()?;
        self.enter_submitting();
        Ok(())
    }

    pub fn complete(&mut self) {
        self.form.set_disabled(false);
        self.errors = FormErrors::default();
        self.state = SubmissionState::Closed;
    }

    /// 提交失败：服务端字段错误显示在表单内并返回 true；其他错误只恢复编辑
    pub fn fail(&mut self, error: &DashboardError) -> bool {
        self.form.set_disabled(false);
        match error {
            DashboardError::Validation(errors) => {
                self.show_errors(errors);
                true
            }
            other => match other.server_field_errors() {
                Some(errors) => {
                    self.show_errors(&errors);
                    true
                }
                None => {
                    self.state = SubmissionState::Editing;
                    false
                }
            },
        }
    }

    pub fn cancel(&mut self) {
        self.complete();
    }

    /// 能对应到表单字段的错误高亮该字段，其余收进摘要
    pub fn show_errors(&mut self, errors: &FieldErrors) {
        let mut rendered = FormErrors::default();
        for (name, message) in errors {
            if self.form.has_field(name) {
                rendered.fields.insert(name.clone(), message.clone());
            } else {
                rendered.summary.push(message.clone());
            }
        }
        self.errors = rendered;
        self.state = SubmissionState::EditingWithErrors;
    }

    fn ensure_idle(&self) -> DashboardResult<()> {
        match self.state {
            SubmissionState::Submitting => Err(DashboardError::SubmissionInFlight),
            SubmissionState::Closed => Err(DashboardError::Unsupported("表单已关闭".to_string())),
            SubmissionState::Editing | SubmissionState::EditingWithErrors => Ok(()),
        }
    }

    fn enter_submitting(&mut self) {
        self.errors = FormErrors::default();
        self.form.set_disabled(true);
        self.state = SubmissionState::Submitting;
    }
}
