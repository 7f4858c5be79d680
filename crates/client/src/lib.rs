//! 控制台客户端：REST传输、区域控制器、分页/搜索视图模型、侧边栏导航与路由分派

pub mod areas;
pub mod controller;
pub mod navigation;
pub mod resource;
pub mod router;
pub mod transport;
pub mod views;

pub use areas::{
    AreaDescriptor, HistoryArea, QueueArea, ScheduledJobsArea, SchedulesArea, WorkersArea,
    WorkingArea,
};
pub use controller::{AreaController, ControllerContext, ControllerEvent, DashboardController};
pub use navigation::{NavItem, Navigation, NavigationEvent};
pub use resource::ResourceClient;
pub use router::{RoutedController, Router};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
pub use views::{PagerView, SearchView, ViewEvent};
