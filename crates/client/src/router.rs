//! 片段路由分派
//!
//! 片段先在全局路由表中匹配出区域和原始参数，再交给该区域的控制器。
//! 匹配不到的片段落到 Dashboard，不向用户报错。

use std::collections::HashMap;

use async_trait::async_trait;
use dashboard_domain::route::match_fragment;
use dashboard_domain::{Area, AreaState, RawRouteParams};
use dashboard_errors::DashboardResult;
use tracing::debug;

use crate::areas::AreaDescriptor;
use crate::controller::{AreaController, DashboardController};

/// 能够被路由调用的控制器
#[async_trait]
pub trait RoutedController: Send {
    fn area(&self) -> Area;

    /// 当前片段，由状态重新编码
    fn fragment(&self) -> String;

    /// 列表状态；Dashboard 没有
    fn state(&self) -> Option<&AreaState> {
        None
    }

    async fn index(&mut self, params: &RawRouteParams) -> DashboardResult<()>;
}

#[async_trait]
impl<D: AreaDescriptor> RoutedController for AreaController<D> {
    fn area(&self) -> Area {
        D::AREA
    }

    fn fragment(&self) -> String {
        AreaController::fragment(self)
    }

    fn state(&self) -> Option<&AreaState> {
        Some(AreaController::state(self))
    }

    async fn index(&mut self, params: &RawRouteParams) -> DashboardResult<()> {
        AreaController::index(self, params).await
    }
}

#[async_trait]
impl RoutedController for DashboardController {
    fn area(&self) -> Area {
        Area::Dashboard
    }

    fn fragment(&self) -> String {
        String::new()
    }

    async fn index(&mut self, _params: &RawRouteParams) -> DashboardResult<()> {
        DashboardController::index(self).await.map(|_| ())
    }
}

#[derive(Default)]
pub struct Router {
    controllers: HashMap<Area, Box<dyn RoutedController>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut areas: Vec<_> = self.controllers.keys().collect();
        areas.sort();
        f.debug_struct("Router").field("areas", &areas).finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: RoutedController + 'static>(&mut self, controller: C) {
        self.controllers.insert(controller.area(), Box::new(controller));
    }

    pub fn controller(&self, area: Area) -> Option<&(dyn RoutedController + 'static)> {
        self.controllers.get(&area).map(|controller| controller.as_ref())
    }

    pub fn controller_mut(&mut self, area: Area) -> Option<&mut (dyn RoutedController + 'static)> {
        self.controllers.get_mut(&area).map(|controller| controller.as_mut())
    }

    /// 分派片段，返回实际处理它的区域
    pub async fn dispatch(&mut self, fragment: &str) -> DashboardResult<Area> {
        let matched = match_fragment(fragment);
        debug!("片段 {:?} 匹配 {} ({})", fragment, matched.area, matched.pattern);

        match self.controllers.get_mut(&matched.area) {
            Some(controller) => {
                controller.index(&matched.params).await?;
                Ok(matched.area)
            }
            None => match self.controllers.get_mut(&Area::Dashboard) {
                Some(dashboard) => {
                    debug!("{} 没有注册控制器，回落到 Dashboard", matched.area);
                    dashboard.index(&RawRouteParams::default()).await?;
                    Ok(Area::Dashboard)
                }
                None => Ok(Area::Dashboard),
            },
        }
    }
}
