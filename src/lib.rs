//! TillReports: reporting engine for a multi-tenant point-of-sale backend
//!
//! Generates summary, sales, product, payment and operations reports over
//! completed orders, caches them per tenant, and renders them as CSV, XLSX
//! or PDF, one at a time or as queued bulk ZIP exports.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::catalog;
pub use modules::exports;
pub use modules::reports;
