//! Support and resistance level detection by bounce counting on a price grid.

pub mod config;
pub mod core;
pub mod levels;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
