//! 控制台基础设施：日志初始化、类型化事件总线、通知服务、防抖队列与日期工具

pub mod dates;
pub mod debounce;
pub mod events;
pub mod logging;
pub mod notice;

pub use debounce::DebounceRegistry;
pub use events::{EventBus, Subscription};
pub use logging::init_logging;
pub use notice::{Notice, NoticeEvent, NoticeKind, NoticeService};
