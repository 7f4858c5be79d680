//! 分页与搜索视图模型
//!
//! 纯函数：从区域状态生成显示数据，用户操作以 [`ViewEvent`] 交回控制器处理，
//! 视图本身从不修改状态。

use dashboard_domain::AreaState;
use serde::{Deserialize, Serialize};

/// 分页条最多展示的页码数
pub const PAGER_WINDOW: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Page(i64),
    SearchSubmit(String),
    SearchCancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerView {
    pub page_number: i64,
    pub page_count: i64,
    pub total_count: i64,
    pub previous: Option<i64>,
    pub next: Option<i64>,
    /// 当前页附近的页码窗口
    pub pages: Vec<i64>,
}

impl PagerView {
    pub fn from_state(state: &AreaState) -> Self {
        let page_count = state.page_count.max(0);
        let page_number = state.page_number.max(1);

        let pages = if page_count == 0 {
            Vec::new()
        } else {
            let half = PAGER_WINDOW / 2;
            let first = (page_number - half).clamp(1, (page_count - PAGER_WINDOW + 1).max(1));
            let last = (first + PAGER_WINDOW - 1).min(page_count);
            (first..=last).collect()
        };

        Self {
            page_number,
            page_count,
            total_count: state.total_count.max(0),
            previous: (page_number > 1).then(|| page_number - 1),
            next: (page_number < page_count).then(|| page_number + 1),
            pages,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.page_count > 1
    }

    pub fn summary(&self) -> String {
        format!(
            "Page {} of {} ({} total)",
            self.page_number,
            self.page_count.max(1),
            self.total_count
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchView {
    pub text: String,
    /// 有搜索条件时显示取消按钮
    pub can_cancel: bool,
    pub loading: bool,
}

impl SearchView {
    pub fn from_state(state: &AreaState) -> Self {
        Self {
            text: state.search.clone(),
            can_cancel: !state.search.is_empty(),
            loading: state.loading,
        }
    }
}
