pub mod api;
pub mod dashboard_config;
pub mod display;
pub mod logging;

pub use api::*;
pub use dashboard_config::*;
pub use display::*;
pub use logging::*;
