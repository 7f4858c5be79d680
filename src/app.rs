use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use dashboard_client::{
    AreaController, ControllerContext, DashboardController, HistoryArea, HttpTransport, NavItem,
    Navigation, NavigationEvent, QueueArea, ResourceClient, Router, ScheduledJobsArea,
    SchedulesArea, Transport, WorkersArea, WorkingArea,
};
use dashboard_config::DashboardConfig;
use dashboard_core::{DebounceRegistry, Subscription};
use dashboard_domain::{Area, AreaState};
use dashboard_forms::{FormCatalog, FormStyle};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// 侧边栏渲染在去抖队列中的名称
const SIDEBAR_RENDER_KEY: &str = "sidebar";

/// 控制台应用：装配传输层、表单目录、各区域控制器、路由与侧边栏
pub struct Application {
    config: DashboardConfig,
    context: ControllerContext,
    router: Router,
    navigation: Navigation,
    render_queue: DebounceRegistry,
    rendered: Arc<Mutex<Vec<NavItem>>>,
    _render_subscription: Subscription,
}

impl Application {
    /// 使用配置中的接口地址创建应用
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.api).context("创建HTTP传输失败")?;
        info!("接口根地址: {}", transport.base_url());
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: DashboardConfig, transport: Arc<dyn Transport>) -> Self {
        let style = FormStyle {
            date_pattern: config.display.date_pattern.clone(),
        };
        let context = ControllerContext::new(ResourceClient::new(transport))
            .with_forms(Arc::new(FormCatalog::new(style)));

        let mut router = Router::new();
        router.register(DashboardController::new(context.clone()));
        router.register(AreaController::new(QueueArea, context.clone()));
        router.register(AreaController::new(HistoryArea, context.clone()));
        router.register(AreaController::new(SchedulesArea, context.clone()));
        router.register(AreaController::new(ScheduledJobsArea, context.clone()));
        router.register(AreaController::new(WorkersArea, context.clone()));
        router.register(AreaController::new(WorkingArea, context.clone()));
        debug!("已注册路由: {:?}", router);

        let navigation = Navigation::new();
        navigation.bind(&context.events);

        // 连续的计数和导航变化合并为一次侧边栏渲染
        let render_queue = DebounceRegistry::new(Duration::from_millis(
            config.navigation.render_debounce_ms,
        ));
        let rendered = Arc::new(Mutex::new(navigation.items()));
        let render_subscription = {
            let queue = render_queue.clone();
            let rendered = Arc::clone(&rendered);
            navigation.subscribe(move |event| {
                let NavigationEvent::Changed(items) = event;
                let items = items.clone();
                let rendered = Arc::clone(&rendered);
                queue.enqueue(SIDEBAR_RENDER_KEY, move || render_sidebar(&rendered, items));
            })
        };

        Self {
            config,
            context,
            router,
            navigation,
            render_queue,
            rendered,
            _render_subscription: render_subscription,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn context(&self) -> &ControllerContext {
        &self.context
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// 最近一次渲染出的侧边栏
    pub fn sidebar(&self) -> Vec<NavItem> {
        self.rendered
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    pub fn is_render_pending(&self) -> bool {
        self.render_queue.is_pending(SIDEBAR_RENDER_KEY)
    }

    /// 打开片段：路由分派到对应控制器并拉取数据
    pub async fn open(&mut self, fragment: &str) -> Result<Area> {
        let area = self
            .router
            .dispatch(fragment)
            .await
            .with_context(|| format!("打开片段失败: #{fragment}"))?;
        self.navigation.set_current(area);
        info!("已打开 {} (#{})", area, self.fragment(area));
        Ok(area)
    }

    /// 通过 Dashboard 控制器刷新侧边栏计数
    pub async fn refresh_counts(&mut self) -> Result<()> {
        let dashboard = self
            .router
            .controller_mut(Area::Dashboard)
            .context("Dashboard 控制器未注册")?;
        dashboard
            .index(&Default::default())
            .await
            .context("刷新计数失败")?;
        Ok(())
    }

    pub fn state(&self, area: Area) -> Option<&AreaState> {
        self.router
            .controller(area)
            .and_then(|controller| controller.state())
    }

    pub fn fragment(&self, area: Area) -> String {
        self.router
            .controller(area)
            .map(|controller| controller.fragment())
            .unwrap_or_default()
    }

    /// 按配置的间隔反复刷新片段和计数，直到收到关闭信号
    pub async fn watch(&mut self, fragment: &str, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let area = self.open(fragment).await?;
        let interval = Duration::from_secs(self.config.navigation.refresh_interval_seconds);
        info!("每 {:?} 刷新一次 {}", interval, area);

        let mut ticker = tokio::time::interval(interval);
        // 第一次 tick 立即完成，片段刚刚打开过
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.open(fragment).await {
                        warn!("刷新失败: {e:#}");
                    }
                    if area != Area::Dashboard {
                        if let Err(e) = self.refresh_counts().await {
                            warn!("{e:#}");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("停止刷新");
                    break;
                }
            }
        }

        Ok(())
    }
}

fn render_sidebar(rendered: &Mutex<Vec<NavItem>>, items: Vec<NavItem>) {
    for item in &items {
        debug!(
            "侧边栏 {}{}: {}",
            item.title,
            if item.active { " *" } else { "" },
            item.count.map(|count| count.to_string()).unwrap_or_default()
        );
    }
    if let Ok(mut current) = rendered.lock() {
        *current = items;
    }
}
