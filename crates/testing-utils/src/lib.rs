//! # Dashboard Testing Utils
//!
//! Shared testing utilities for the scheduler dashboard workspace.
//!
//! ## Features
//!
//! - **Mock Transport**: scripted in-memory backend recording every request
//! - **Test Data Builders**: wire-shaped records and list responses
//! - **Test Helpers**: waiting on timers, event recording, test logging
//!
//! ## Usage
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! dashboard-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use helpers::*;
pub use mocks::*;
