use std::collections::{HashMap, HashSet};

use crate::modules::catalog::models::{
    ModifierRule, ModifierSelection, ModifierSet, SelectionError, ValidationOutcome,
};

/// Check selections against a rule
pub fn validate_selections(rule: &ModifierRule, selections: &[ModifierSelection]) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    for selection in selections.iter().filter(|s| s.quantity == 0) {
        outcome.push(SelectionError::ZeroQuantity {
            option_id: selection.option_id.clone(),
        });
    }

    let picked: Vec<&ModifierSelection> = selections.iter().filter(|s| s.quantity > 0).collect();
    let rule_outcome = match *rule {
        ModifierRule::Single { required } => validate_single(required, &picked),
        ModifierRule::Multiple { min, max } => validate_multiple(min, max, &picked),
        ModifierRule::Quantity {
            max_per_option,
            max_total,
        } => validate_quantity(max_per_option, max_total, &picked),
    };
    outcome.merge(rule_outcome)
}

/// Rule checks plus membership of every option in the set
pub fn validate_for_set(set: &ModifierSet, selections: &[ModifierSelection]) -> ValidationOutcome {
    let offered: HashSet<&str> = set.option_ids.iter().map(String::as_str).collect();
    let mut outcome = ValidationOutcome::default();
    for selection in selections {
        if !offered.contains(selection.option_id.as_str()) {
            outcome.push(SelectionError::UnknownOption {
                option_id: selection.option_id.clone(),
            });
        }
    }
    outcome.merge(validate_selections(&set.rule, selections))
}

fn duplicates(picked: &[&ModifierSelection]) -> Vec<SelectionError> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    picked
        .iter()
        .filter(|s| s.quantity > 1 || !seen.insert(s.option_id.as_str()))
        .filter(|s| reported.insert(s.option_id.as_str()))
        .map(|s| SelectionError::Duplicate {
            option_id: s.option_id.clone(),
        })
        .collect()
}

fn validate_single(required: bool, picked: &[&ModifierSelection]) -> ValidationOutcome {
    let mut outcome = ValidationOutcome {
        errors: duplicates(picked),
    };
    let distinct = picked
        .iter()
        .map(|s| s.option_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u32;

    if required && distinct == 0 {
        outcome.push(SelectionError::Required);
    }
    if distinct > 1 {
        outcome.push(SelectionError::TooMany {
            max: 1,
            got: distinct,
        });
    }
    outcome
}

fn validate_multiple(min: u32, max: Option<u32>, picked: &[&ModifierSelection]) -> ValidationOutcome {
    let mut outcome = ValidationOutcome {
        errors: duplicates(picked),
    };
    let distinct = picked
        .iter()
        .map(|s| s.option_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u32;

    if distinct < min {
        outcome.push(SelectionError::TooFew { min, got: distinct });
    }
    if let Some(max) = max {
        if distinct > max {
            outcome.push(SelectionError::TooMany { max, got: distinct });
        }
    }
    outcome
}

fn validate_quantity(
    max_per_option: u32,
    max_total: Option<u32>,
    picked: &[&ModifierSelection],
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    // The same option may arrive split over several lines
    let mut per_option: HashMap<&str, u32> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for selection in picked {
        let entry = per_option.entry(selection.option_id.as_str()).or_insert_with(|| {
            order.push(selection.option_id.as_str());
            0
        });
        *entry = entry.saturating_add(selection.quantity);
    }

    for option_id in &order {
        if per_option[option_id] > max_per_option {
            outcome.push(SelectionError::QuantityExceeded {
                option_id: option_id.to_string(),
                max: max_per_option,
            });
        }
    }

    let total = per_option
        .values()
        .fold(0u32, |sum, quantity| sum.saturating_add(*quantity));
    if let Some(max) = max_total {
        if total > max {
            outcome.push(SelectionError::TotalExceeded { max, got: total });
        }
    }
    outcome
}
