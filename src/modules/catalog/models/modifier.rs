use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a modifier set may be picked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "selection_type", rename_all = "snake_case")]
pub enum ModifierRule {
    /// At most one option ("Milk: whole / oat / soy")
    Single { required: bool },
    /// Several distinct options, each at most once
    Multiple { min: u32, max: Option<u32> },
    /// Options may be repeated ("extra shot x2")
    Quantity {
        max_per_option: u32,
        max_total: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSet {
    pub id: String,
    pub name: String,
    pub rule: ModifierRule,
    /// Ids of the options currently offered in this set
    pub option_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSelection {
    pub option_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl ModifierSelection {
    pub fn new(option_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            option_id: option_id.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SelectionError {
    #[error("Option {option_id} is not part of this modifier set")]
    UnknownOption { option_id: String },

    #[error("Option {option_id} has a zero quantity")]
    ZeroQuantity { option_id: String },

    #[error("A selection is required")]
    Required,

    #[error("At most {max} option(s) may be selected, got {got}")]
    TooMany { max: u32, got: u32 },

    #[error("At least {min} option(s) must be selected, got {got}")]
    TooFew { min: u32, got: u32 },

    #[error("Option {option_id} may only be selected once")]
    Duplicate { option_id: String },

    #[error("Option {option_id} may be selected at most {max} time(s)")]
    QuantityExceeded { option_id: String, max: u32 },

    #[error("At most {max} item(s) may be selected in total, got {got}")]
    TotalExceeded { max: u32, got: u32 },
}

/// Result of checking a set of selections; empty `errors` means valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub errors: Vec<SelectionError>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: SelectionError) {
        self.errors.push(error);
    }

    pub fn merge(mut self, other: ValidationOutcome) -> Self {
        self.errors.extend(other.errors);
        self
    }
}
