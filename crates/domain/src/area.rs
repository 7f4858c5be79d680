use serde::{Deserialize, Serialize};

/// 控制台区域
///
/// 六个结构相同的 CRUD 区域加上非 CRUD 的 Dashboard。
/// `ScheduledJobs` 嵌套在某个 Schedule 之下。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Area {
    Dashboard,
    Queue,
    History,
    Schedules,
    ScheduledJobs,
    Workers,
    Working,
}

impl Area {
    pub const ALL: [Area; 7] = [
        Area::Dashboard,
        Area::Queue,
        Area::History,
        Area::Schedules,
        Area::ScheduledJobs,
        Area::Workers,
        Area::Working,
    ];

    /// 侧边栏中展示计数的区域（嵌套区域不单独出现）
    pub const SIDEBAR: [Area; 6] = [
        Area::Dashboard,
        Area::Queue,
        Area::Working,
        Area::History,
        Area::Workers,
        Area::Schedules,
    ];

    /// 片段的首段
    pub fn fragment(&self) -> &'static str {
        match self {
            Area::Dashboard => "",
            Area::Queue => "queue",
            Area::History => "history",
            Area::Schedules | Area::ScheduledJobs => "schedules",
            Area::Workers => "workers",
            Area::Working => "working",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Area::Dashboard => "Dashboard",
            Area::Queue => "Queue",
            Area::History => "History",
            Area::Schedules => "Schedules",
            Area::ScheduledJobs => "Scheduled Jobs",
            Area::Workers => "Workers",
            Area::Working => "Working",
        }
    }

    /// 接口返回的计数字段名
    pub fn counts_key(&self) -> Option<&'static str> {
        match self {
            Area::Queue => Some("QueueCount"),
            Area::History => Some("HistoryCount"),
            Area::Schedules => Some("ScheduleCount"),
            Area::Workers => Some("WorkerCount"),
            Area::Working => Some("WorkingCount"),
            Area::Dashboard | Area::ScheduledJobs => None,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Area::ScheduledJobs)
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
