pub mod modifier_validation;

pub use modifier_validation::{validate_for_set, validate_selections};
