//! 区域描述
//!
//! 六个区域共用同一个控制器，差异（资源路径、可用操作、表单、提示语）
//! 都由各自的描述结构提供。

use dashboard_domain::{Area, AreaState, Record};
use dashboard_forms::FormKind;

pub const SCHEDULE_ID_ATTRIBUTE: &str = "ScheduleId";

pub trait AreaDescriptor: Send + Sync + 'static {
    const AREA: Area;

    /// 名词单数，用于提示语
    fn noun(&self) -> &'static str;

    /// 相对于接口根地址的集合路径
    fn resource_path(&self, _state: &AreaState) -> String {
        Self::AREA.fragment().to_string()
    }

    fn edit_form(&self) -> Option<FormKind> {
        None
    }

    fn signal_form(&self) -> Option<FormKind> {
        None
    }

    fn can_delete(&self) -> bool {
        self.edit_form().is_some()
    }

    fn new_record(&self, _state: &AreaState) -> Record {
        Record::new()
    }

    fn saved_message(&self, created: bool) -> String {
        if created {
            format!("{} created.", self.noun())
        } else {
            format!("{} saved.", self.noun())
        }
    }

    fn deleted_message(&self) -> String {
        format!("{} deleted.", self.noun())
    }

    fn signalled_message(&self, signal: &str) -> String {
        format!("{} signalled: {}.", self.noun(), signal)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueueArea;

impl AreaDescriptor for QueueArea {
    const AREA: Area = Area::Queue;

    fn noun(&self) -> &'static str {
        "Job"
    }

    fn edit_form(&self) -> Option<FormKind> {
        Some(FormKind::QueueJob)
    }
}

/// 只读区域
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryArea;

impl AreaDescriptor for HistoryArea {
    const AREA: Area = Area::History;

    fn noun(&self) -> &'static str {
        "History entry"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulesArea;

impl AreaDescriptor for SchedulesArea {
    const AREA: Area = Area::Schedules;

    fn noun(&self) -> &'static str {
        "Schedule"
    }

    fn edit_form(&self) -> Option<FormKind> {
        Some(FormKind::Schedule)
    }
}

/// 嵌套在某个计划之下，父编号来自区域状态
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduledJobsArea;

impl AreaDescriptor for ScheduledJobsArea {
    const AREA: Area = Area::ScheduledJobs;

    fn noun(&self) -> &'static str {
        "Scheduled job"
    }

    fn resource_path(&self, state: &AreaState) -> String {
        format!("{}/{}/jobs", Self::AREA.fragment(), state.parent_id)
    }

    fn edit_form(&self) -> Option<FormKind> {
        Some(FormKind::ScheduledJob)
    }

    fn new_record(&self, state: &AreaState) -> Record {
        let mut record = Record::new();
        record.set(SCHEDULE_ID_ATTRIBUTE, state.parent_id);
        record
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkersArea;

impl AreaDescriptor for WorkersArea {
    const AREA: Area = Area::Workers;

    fn noun(&self) -> &'static str {
        "Worker"
    }

    fn edit_form(&self) -> Option<FormKind> {
        Some(FormKind::Worker)
    }

    fn signal_form(&self) -> Option<FormKind> {
        Some(FormKind::WorkerSignal)
    }
}

/// 正在执行的任务只能发送信号
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkingArea;

impl AreaDescriptor for WorkingArea {
    const AREA: Area = Area::Working;

    fn noun(&self) -> &'static str {
        "Job"
    }

    fn signal_form(&self) -> Option<FormKind> {
        Some(FormKind::WorkingSignal)
    }
}
