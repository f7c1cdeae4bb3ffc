pub mod modifier;

pub use modifier::{
    ModifierRule, ModifierSelection, ModifierSet, SelectionError, ValidationOutcome,
};
