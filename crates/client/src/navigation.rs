//! 侧边栏导航与计数同步
//!
//! 订阅控制器总线：`Counts` 更新各区域最近一次的计数，`Navigate` 更新当前区域。
//! 只有显示内容真正变化时才发出 [`NavigationEvent::Changed`]。

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use dashboard_core::{EventBus, Subscription};
use dashboard_domain::route::{encode, RouteParams};
use dashboard_domain::{Area, Counts};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::ControllerEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub area: Area,
    pub title: String,
    pub fragment: String,
    pub count: Option<i64>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Changed(Vec<NavItem>),
}

#[derive(Debug)]
struct NavigationState {
    counts: BTreeMap<Area, i64>,
    current: Area,
}

impl NavigationState {
    fn items(&self) -> Vec<NavItem> {
        Area::SIDEBAR
            .iter()
            .map(|area| NavItem {
                area: *area,
                title: area.title().to_string(),
                fragment: encode(&RouteParams::new(*area)),
                count: self.counts.get(area).copied(),
                active: *area == self.current,
            })
            .collect()
    }

    fn apply_counts(&mut self, counts: &Counts) -> bool {
        let mut changed = false;
        for (area, count) in counts.iter() {
            if self.counts.insert(area, count) != Some(count) {
                changed = true;
            }
        }
        changed
    }

    /// 嵌套区域在侧边栏中高亮其父区域
    fn apply_current(&mut self, area: Area) -> bool {
        let area = if area.is_nested() { Area::Schedules } else { area };
        if self.current == area {
            return false;
        }
        self.current = area;
        true
    }
}

#[derive(Debug, Clone)]
pub struct Navigation {
    state: Arc<Mutex<NavigationState>>,
    events: EventBus<NavigationEvent>,
    subscription: Arc<Mutex<Option<Subscription>>>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigation {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(NavigationState {
                counts: BTreeMap::new(),
                current: Area::Dashboard,
            })),
            events: EventBus::new(),
            subscription: Arc::new(Mutex::new(None)),
        }
    }

    /// 绑定控制器总线；重复绑定会替换之前的订阅
    pub fn bind(&self, bus: &EventBus<ControllerEvent>) {
        let navigation = self.clone_detached();
        let subscription = bus.subscribe(move |event| navigation.handle(event));
        *lock(&self.subscription) = Some(subscription);
    }

    pub fn unbind(&self) {
        lock(&self.subscription).take();
    }

    /// 不持有订阅句柄的副本，避免订阅闭包反向持有自身
    fn clone_detached(&self) -> Navigation {
        Navigation {
            state: Arc::clone(&self.state),
            events: self.events.clone(),
            subscription: Arc::new(Mutex::new(None)),
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&NavigationEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn items(&self) -> Vec<NavItem> {
        lock(&self.state).items()
    }

    pub fn count(&self, area: Area) -> Option<i64> {
        lock(&self.state).counts.get(&area).copied()
    }

    pub fn current(&self) -> Area {
        lock(&self.state).current
    }

    pub fn handle(&self, event: &ControllerEvent) {
        self.update(|state| match event {
            ControllerEvent::Counts(counts) => state.apply_counts(counts),
            ControllerEvent::Navigate { area, .. } => state.apply_current(*area),
        });
    }

    /// 路由入口打开区域时调用；入口路径不会发出 `Navigate`，当前区域只能由此同步
    pub fn set_current(&self, area: Area) {
        self.update(|state| state.apply_current(area));
    }

    fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut NavigationState) -> bool,
    {
        let items = {
            let mut state = lock(&self.state);
            if !apply(&mut state) {
                return;
            }
            state.items()
        };

        debug!("侧边栏已更新");
        self.events.publish(&NavigationEvent::Changed(items));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_domain::AreaState;

    fn counts(queue: i64, workers: i64) -> Counts {
        Counts {
            queue_count: queue,
            worker_count: workers,
            ..Counts::default()
        }
    }

    fn recorder(navigation: &Navigation) -> (Arc<Mutex<Vec<NavigationEvent>>>, Subscription) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let sub = navigation.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
        (events, sub)
    }

    #[test]
    fn test_counts_update_once_per_change() {
        let bus = EventBus::new();
        let navigation = Navigation::new();
        navigation.bind(&bus);
        let (events, _sub) = recorder(&navigation);

        bus.publish(&ControllerEvent::Counts(counts(3, 1)));
        bus.publish(&ControllerEvent::Counts(counts(3, 1)));
        bus.publish(&ControllerEvent::Counts(counts(4, 1)));

        assert_eq!(events.lock().unwrap().len(), 2);
        assert_eq!(navigation.count(Area::Queue), Some(4));
        assert_eq!(navigation.count(Area::Workers), Some(1));
        assert_eq!(navigation.count(Area::Dashboard), None);
    }

    #[test]
    fn test_navigate_tracks_current_area() {
        let bus = EventBus::new();
        let navigation = Navigation::new();
        navigation.bind(&bus);

        bus.publish(&ControllerEvent::Navigate {
            area: Area::ScheduledJobs,
            state: AreaState::default(),
            fragment: "schedules/id/2/jobs".to_string(),
        });

        assert_eq!(navigation.current(), Area::Schedules);
        let active: Vec<_> = navigation
            .items()
            .into_iter()
            .filter(|item| item.active)
            .map(|item| item.area)
            .collect();
        assert_eq!(active, vec![Area::Schedules]);
    }

    #[test]
    fn test_set_current_without_bus() {
        let navigation = Navigation::new();
        let (events, _sub) = recorder(&navigation);

        navigation.set_current(Area::Queue);
        navigation.set_current(Area::Queue);
        navigation.set_current(Area::ScheduledJobs);

        assert_eq!(navigation.current(), Area::Schedules);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        let NavigationEvent::Changed(items) = &events[0];
        let active: Vec<_> = items.iter().filter(|item| item.active).map(|item| item.area).collect();
        assert_eq!(active, vec![Area::Queue]);
    }

    #[test]
    fn test_unbind_stops_updates() {
        let bus = EventBus::new();
        let navigation = Navigation::new();
        navigation.bind(&bus);
        assert_eq!(bus.subscriber_count(), 1);

        navigation.unbind();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(&ControllerEvent::Counts(counts(9, 9)));
        assert_eq!(navigation.count(Area::Queue), None);
    }

    #[test]
    fn test_items_follow_sidebar_order() {
        let navigation = Navigation::new();
        let items = navigation.items();
        assert_eq!(items.len(), Area::SIDEBAR.len());
        assert_eq!(items[0].area, Area::Dashboard);
        assert!(items[0].active);
        assert_eq!(items[1].fragment, "queue");
    }
}
