// Test Helper Modules
//
// In-memory fixtures for integration and contract tests. The whole reporting
// pipeline runs against `InMemoryReportRepository` and `InMemoryReportCacheStore`,
// so no MySQL instance is needed.
//
// Usage (from a [[test]] crate):
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
//   use helpers::*;

#![allow(dead_code)]

pub mod test_data;
pub mod test_services;

pub use test_data::*;
pub use test_services::*;
