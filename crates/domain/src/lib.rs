//! 控制台领域模型：区域、记录、列表页、区域状态与路由编解码

pub mod area;
pub mod counts;
pub mod page;
pub mod record;
pub mod route;
pub mod state;

pub use area::Area;
pub use counts::Counts;
pub use dashboard_errors::{DashboardError, DashboardResult};
pub use page::ListPage;
pub use record::{attributes_to_wire, AttributeMap, AttributeValue, PendingSignal, Record};
pub use route::{RawRouteParams, RouteMatch, RouteParams};
pub use state::{AreaModel, AreaState, ModelChange};
