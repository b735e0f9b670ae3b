//! Data layer shared by every view: configuration, the metrics table and the
//! statistics computed over it.

pub mod config;
pub mod csv;
pub mod format;
pub mod loader;
pub mod stats;
pub mod table;

pub use config::{DashboardConfig, SharedConfig};
pub use table::{Metric, MetricRow, MetricsTable, SharedTable};
