//! Catalog rules shared with order entry: modifier-set selection validation,
//! exposed at `POST /catalog/modifiers/validate`.

pub mod controllers;
pub mod models;
pub mod services;

pub use models::{ModifierRule, ModifierSelection, ModifierSet, SelectionError, ValidationOutcome};
pub use services::{validate_for_set, validate_selections};
