//! Test utilities for the erasure workspace.
//!
//! This module provides reusable builders for test configurations and
//! catalog/data mapper fixtures.
//!
//! # Feature Flag
//!
//! This module is only available when the `testing` feature is enabled or during tests:
//!
//! ```toml
//! [dev-dependencies]
//! common = { path = "../common", features = ["testing"] }
//! ```

mod config_builder;
mod fixtures;

pub use config_builder::TestConfigBuilder;
pub use fixtures::{data_mapper, data_mapper_record};
