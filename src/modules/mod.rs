pub mod catalog;
pub mod exports;
pub mod health;
pub mod reports;
