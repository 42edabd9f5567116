//! Per-step validation of the draft.
//!
//! Each validator is a pure function over its slice of the draft. They run on every
//! change for inline feedback and again before the wizard moves forward.

use std::fmt;

use thiserror::Error;

use crate::mapper::{self, FieldRule, ACTION_RULES, CONDITION_RULES};
use crate::models::{FieldValue, KindedValue, PromotionDraft};

pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 10;

/// A problem with one field, addressed by a dotted path such as `rules.0.value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every problem found in a step, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} validation error(s): {}", .errors.len(), join(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Messages for one field, for inline display.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

/// General info: name, priority, validity period.
pub fn validate_general(draft: &PromotionDraft) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if draft.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Promotion name is required"));
    }

    if let Some(priority) = draft.priority {
        if priority < MIN_PRIORITY {
            errors.push(FieldError::new("priority", format!("Minimum {MIN_PRIORITY}")));
        } else if priority > MAX_PRIORITY {
            errors.push(FieldError::new("priority", format!("Maximum {MAX_PRIORITY}")));
        }
    }

    match (draft.validity.start, draft.validity.end) {
        (None, _) => errors.push(FieldError::new("validity.start", "Start date is required")),
        (Some(start), Some(end)) if end <= start => errors.push(FieldError::new(
            "validity.end",
            "End date must be after the start date",
        )),
        _ => {}
    }

    finish(errors)
}

/// Trigger conditions: at least one, each with a kind and a non-negative or non-empty value.
pub fn validate_rules(rules: &[KindedValue]) -> Result<(), ValidationErrors> {
    finish(validate_rows(
        "rules",
        rules,
        CONDITION_RULES,
        Strictness::NonNegative,
        "Add at least one rule",
        "Select a rule type",
    ))
}

/// Rewards: at least one, each with a kind and a positive or non-empty value.
pub fn validate_rewards(rewards: &[KindedValue]) -> Result<(), ValidationErrors> {
    finish(validate_rows(
        "rewards",
        rewards,
        ACTION_RULES,
        Strictness::Positive,
        "Add at least one reward",
        "Select a reward type",
    ))
}

/// Flag rows whose kind the catalog no longer offers.
pub fn validate_kinds_offered(
    field: &str,
    rows: &[KindedValue],
    offered: &[String],
) -> Result<(), ValidationErrors> {
    let errors = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.kind.is_empty() && !offered.iter().any(|k| *k == row.kind))
        .map(|(index, row)| {
            FieldError::new(
                format!("{field}.{index}.kind"),
                format!("{} is not currently offered", row.kind),
            )
        })
        .collect();
    finish(errors)
}

#[derive(Debug, Clone, Copy)]
enum Strictness {
    NonNegative,
    Positive,
}

impl Strictness {
    fn accepts(self, n: f64) -> bool {
        match self {
            Strictness::NonNegative => n >= 0.0,
            Strictness::Positive => n > 0.0,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Strictness::NonNegative => "Must be zero or more",
            Strictness::Positive => "Must be greater than zero",
        }
    }
}

/// The message for an invalid value, or `None` when it is fine.
///
/// Kinds sent as numbers must hold a finite number (or text that parses to one) that
/// meets the sign rule. Other kinds need a non-blank value; numbers still obey the rule.
fn value_problem(value: &FieldValue, numeric: bool, strictness: Strictness) -> Option<&'static str> {
    if value.is_empty() {
        return Some("A value is required");
    }
    let number = match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(_) if numeric => value.as_number(),
        FieldValue::Text(_) => return None,
    };
    match number.filter(|n| n.is_finite()) {
        None => Some("Must be a number"),
        Some(n) if !strictness.accepts(n) => Some(strictness.message()),
        Some(_) => None,
    }
}

fn validate_rows(
    field: &str,
    rows: &[KindedValue],
    rules: &'static [FieldRule],
    strictness: Strictness,
    empty_message: &str,
    kind_message: &str,
) -> Vec<FieldError> {
    if rows.is_empty() {
        return vec![FieldError::new(field, empty_message)];
    }

    let mut errors = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if row.kind.trim().is_empty() {
            errors.push(FieldError::new(format!("{field}.{index}.kind"), kind_message));
        }
        let numeric = mapper::is_numeric(rules, &row.kind);
        if let Some(message) = value_problem(&row.value, numeric, strictness) {
            errors.push(FieldError::new(format!("{field}.{index}.value"), message));
        }
    }
    errors
}
