//! Read-only summary shown on the review step.

use chrono::{DateTime, Utc};

use super::WizardSession;
use crate::mapper::surplus_entries;
use crate::models::KindedValue;
use crate::registry::{Control, FieldRegistry};

/// A condition or reward as the review step lists it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub kind: String,
    pub label: String,
    pub value: String,
    pub renderable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub name: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub start: Option<DateTime<Utc>>,
    /// `None` means the open-ended default applies on submission.
    pub end: Option<DateTime<Utc>>,
    pub active: bool,
    pub rules: Vec<ReviewRow>,
    pub rewards: Vec<ReviewRow>,
    /// Rows that will not be transmitted.
    pub ignored_rows: usize,
    pub editing: bool,
}

fn review_row(registry: &FieldRegistry, row: &KindedValue) -> ReviewRow {
    let field = registry.render(&row.kind, &row.value);
    let value = match field.control {
        Control::Select { options, .. } => options
            .iter()
            .find(|option| option.value == field.value)
            .map_or(field.value.clone(), |option| option.label.to_string()),
        _ => field.value.clone(),
    };

    ReviewRow {
        kind: row.kind.clone(),
        label: field.label,
        value,
        renderable: !field.disabled,
    }
}

impl WizardSession {
    /// Summarise the draft with kind labels resolved through the registries.
    pub fn review(&self) -> ReviewSummary {
        let draft = self.draft();
        let conditions = FieldRegistry::conditions();
        let actions = FieldRegistry::actions();

        ReviewSummary {
            name: draft.name.clone(),
            description: draft.description.clone(),
            priority: draft.priority,
            start: draft.validity.start,
            end: draft.validity.end,
            active: draft.active,
            rules: draft.rules.iter().map(|r| review_row(&conditions, r)).collect(),
            rewards: draft.rewards.iter().map(|r| review_row(&actions, r)).collect(),
            ignored_rows: surplus_entries(draft),
            editing: self.is_editing(),
        }
    }
}
