//! Sales performance dashboard
//!
//! Extracts a flat sales table from a SQLite store, computes KPIs and
//! grouped breakdowns (region, customer segment, month), and exports the
//! breakdowns as CSV. Rendering lives in [`report`] and [`charts`]; every
//! other module is pure data in, data out.

pub mod analysis;
pub mod charts;
pub mod db;
pub mod error;
pub mod export;
pub mod extract;
pub mod kpi;
pub mod models;
pub mod report;

pub use error::{DashboardError, ErrorKind, Result};
