//! 区域状态
//!
//! `AreaModel` 由控制器独占写入，视图通过 [`AreaModel::subscribe`] 观察变化。
//! 从路由导入的参数静默写入，不产生变化事件。

use dashboard_core::{EventBus, Subscription};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::area::Area;
use crate::page::ListPage;
use crate::record::Record;
use crate::route::RouteParams;

/// 单个区域的导航与列表状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaState {
    pub search: String,
    pub page_number: i64,
    pub page_count: i64,
    pub total_count: i64,
    pub selected_id: i64,
    pub action: String,
    pub loading: bool,
    /// 仅计划任务区域非零
    pub parent_id: i64,
    #[serde(skip)]
    pub collection: Vec<Record>,
}

impl Default for AreaState {
    fn default() -> Self {
        Self {
            search: String::new(),
            page_number: 1,
            page_count: 0,
            total_count: 0,
            selected_id: 0,
            action: String::new(),
            loading: false,
            parent_id: 0,
            collection: Vec::new(),
        }
    }
}

impl AreaState {
    pub fn route_params(&self, area: Area) -> RouteParams {
        RouteParams {
            area,
            parent_id: self.parent_id,
            search: self.search.clone(),
            page_number: self.page_number,
            id: self.selected_id,
            action: self.action.clone(),
        }
    }

    pub fn find(&self, id: i64) -> Option<&Record> {
        self.collection.iter().find(|record| record.id() == id)
    }

    pub fn find_mut(&mut self, id: i64) -> Option<&mut Record> {
        self.collection.iter_mut().find(|record| record.id() == id)
    }

    /// 页码允许的上限；页数未知时为 1
    pub fn max_page(&self) -> i64 {
        self.page_count.max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelChange {
    Search(String),
    PageNumber(i64),
    PageCount(i64),
    TotalCount(i64),
    SelectedId(i64),
    Action(String),
    Loading(bool),
    Collection(usize),
}

#[derive(Debug)]
pub struct AreaModel {
    area: Area,
    state: AreaState,
    events: EventBus<ModelChange>,
}

impl AreaModel {
    pub fn new(area: Area) -> Self {
        Self {
            area,
            state: AreaState::default(),
            events: EventBus::new(),
        }
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn state(&self) -> &AreaState {
        &self.state
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ModelChange) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn route_params(&self) -> RouteParams {
        self.state.route_params(self.area)
    }

    pub fn find_mut(&mut self, id: i64) -> Option<&mut Record> {
        self.state.find_mut(id)
    }

    /// 导入路由参数；静默写入，避免路由与控制器互相回声。
    /// 页数已知时页码同样被限制在 `[1, page_count]`
    pub fn import_route(&mut self, params: &RouteParams) {
        let params = params.normalize();
        self.state.search = params.search;
        self.state.page_number = self.clamp_page(params.page_number);
        self.state.selected_id = params.id;
        self.state.action = params.action;
        self.state.parent_id = params.parent_id;
        self.apply_selection();
        debug!(
            "{} 导入路由参数: q={:?} p={} id={}",
            self.area, self.state.search, self.state.page_number, self.state.selected_id
        );
    }

    pub fn set_search(&mut self, search: &str) -> bool {
        if self.state.search == search {
            return false;
        }
        self.state.search = search.to_string();
        self.emit(ModelChange::Search(self.state.search.clone()));
        true
    }

    /// 页数已知后，页码被限制在 `[1, page_count]`
    pub fn set_page_number(&mut self, page_number: i64) -> bool {
        let page_number = self.clamp_page(page_number);
        if self.state.page_number == page_number {
            return false;
        }
        self.state.page_number = page_number;
        self.emit(ModelChange::PageNumber(page_number));
        true
    }

    pub fn set_selection(&mut self, id: i64, action: &str) -> bool {
        let id = id.max(0);
        let action = if id > 0 { action } else { "" };
        let mut changed = false;

        if self.state.selected_id != id {
            self.state.selected_id = id;
            self.apply_selection();
            self.emit(ModelChange::SelectedId(id));
            changed = true;
        }
        if self.state.action != action {
            self.state.action = action.to_string();
            self.emit(ModelChange::Action(self.state.action.clone()));
            changed = true;
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        self.set_selection(0, "")
    }

    pub fn set_loading(&mut self, loading: bool) -> bool {
        if self.state.loading == loading {
            return false;
        }
        self.state.loading = loading;
        self.emit(ModelChange::Loading(loading));
        true
    }

    /// 用一页列表结果替换集合，并重新标记选中记录
    pub fn replace_collection(&mut self, page: ListPage) {
        let ListPage {
            records,
            page_count,
            page_number,
            total_count,
            ..
        } = page;

        self.state.collection = records;
        self.apply_selection();
        self.emit(ModelChange::Collection(self.state.collection.len()));

        if self.state.page_count != page_count {
            self.state.page_count = page_count;
            self.emit(ModelChange::PageCount(page_count));
        }
        if self.state.total_count != total_count {
            self.state.total_count = total_count;
            self.emit(ModelChange::TotalCount(total_count));
        }
        self.set_page_number(page_number);
    }

    fn clamp_page(&self, page_number: i64) -> i64 {
        if self.state.page_count > 0 {
            page_number.clamp(1, self.state.max_page())
        } else {
            page_number.max(1)
        }
    }

    /// 最多一条记录带有选中标记
    fn apply_selection(&mut self) {
        let selected_id = self.state.selected_id;
        let mut marked = false;
        for record in &mut self.state.collection {
            record.selected = selected_id > 0 && !marked && record.id() == selected_id;
            marked |= record.selected;
        }
    }

    fn emit(&self, change: ModelChange) {
        self.events.publish(&change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn page(ids: &[i64], page_count: i64, page_number: i64) -> ListPage {
        ListPage {
            records: ids.iter().map(|id| Record::with_id(*id)).collect(),
            page_count,
            page_number,
            total_count: ids.len() as i64,
            counts: None,
        }
    }

    fn recorder(model: &AreaModel) -> (Arc<Mutex<Vec<ModelChange>>>, Subscription) {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        let subscription = model.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
        (changes, subscription)
    }

    #[test]
    fn test_import_route_is_silent() {
        let mut model = AreaModel::new(Area::Queue);
        let (changes, _sub) = recorder(&model);

        model.import_route(
            &RouteParams::new(Area::Queue)
                .with_search("foo")
                .with_page(2)
                .with_id(3)
                .with_action("signal"),
        );

        assert!(changes.lock().unwrap().is_empty());
        let state = model.state();
        assert_eq!(state.search, "foo");
        assert_eq!(state.page_number, 2);
        assert_eq!(state.selected_id, 3);
        assert_eq!(state.action, "signal");
    }

    #[test]
    fn test_page_number_kept_until_page_count_known() {
        let mut model = AreaModel::new(Area::Queue);
        model.import_route(&RouteParams::new(Area::Queue).with_page(2));
        assert!(!model.set_page_number(2));
        assert!(model.set_page_number(7));
        assert_eq!(model.state().page_number, 7);

        model.replace_collection(page(&[1], 5, 7));
        assert_eq!(model.state().page_number, 5);
        assert!(!model.set_page_number(9));
        assert!(model.set_page_number(0));
        assert_eq!(model.state().page_number, 1);
    }

    #[test]
    fn test_import_route_clamps_known_page_count() {
        let mut model = AreaModel::new(Area::Queue);
        model.replace_collection(page(&[1], 5, 1));
        let (changes, _sub) = recorder(&model);

        model.import_route(&RouteParams::new(Area::Queue).with_page(9));

        assert!(changes.lock().unwrap().is_empty());
        assert_eq!(model.state().page_number, 5);
        assert_eq!(model.route_params().page_number, 5);
    }

    #[test]
    fn test_selection_marks_single_record() {
        let mut model = AreaModel::new(Area::Workers);
        model.replace_collection(page(&[1, 2, 2, 3], 1, 1));
        model.set_selection(2, "signal");

        let marked: Vec<_> = model
            .state()
            .collection
            .iter()
            .filter(|record| record.selected)
            .collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].id(), 2);

        assert!(model.clear_selection());
        assert!(model.state().collection.iter().all(|r| !r.selected));
        assert_eq!(model.state().action, "");
    }

    #[test]
    fn test_selection_reapplied_after_fetch() {
        let mut model = AreaModel::new(Area::History);
        model.import_route(&RouteParams::new(Area::History).with_id(8));
        model.replace_collection(page(&[7, 8, 9], 1, 1));
        assert!(model.state().find(8).unwrap().selected);
    }

    #[test]
    fn test_setters_emit_only_on_change() {
        let mut model = AreaModel::new(Area::Queue);
        let (changes, _sub) = recorder(&model);

        assert!(model.set_search("abc"));
        assert!(!model.set_search("abc"));
        assert!(model.set_loading(true));
        assert!(!model.set_loading(true));
        assert!(!model.set_selection(0, "delete"));

        assert_eq!(
            *changes.lock().unwrap(),
            vec![ModelChange::Search("abc".to_string()), ModelChange::Loading(true)]
        );
    }

    #[test]
    fn test_route_params_round_trip() {
        let mut model = AreaModel::new(Area::ScheduledJobs);
        let params = RouteParams::new(Area::ScheduledJobs)
            .with_parent(4)
            .with_search("x")
            .with_id(2);
        model.import_route(&params);
        assert_eq!(model.route_params(), params);
    }
}
