use serde::{Deserialize, Serialize};

use crate::area::Area;

/// 各区域的记录数，随列表接口或 `counts` 接口返回
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Counts {
    pub queue_count: i64,
    pub history_count: i64,
    pub schedule_count: i64,
    pub worker_count: i64,
    pub working_count: i64,
}

impl Counts {
    pub fn for_area(&self, area: Area) -> Option<i64> {
        match area {
            Area::Queue => Some(self.queue_count),
            Area::History => Some(self.history_count),
            Area::Schedules => Some(self.schedule_count),
            Area::Workers => Some(self.worker_count),
            Area::Working => Some(self.working_count),
            Area::Dashboard | Area::ScheduledJobs => None,
        }
    }

    /// 按侧边栏顺序列出带计数的区域
    pub fn iter(&self) -> impl Iterator<Item = (Area, i64)> + '_ {
        Area::SIDEBAR
            .iter()
            .filter_map(move |area| self.for_area(*area).map(|count| (*area, count)))
    }
}
