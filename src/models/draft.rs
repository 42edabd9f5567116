//! In-progress promotion data as the wizard steps edit it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Priority given to a fresh draft.
pub const DEFAULT_PRIORITY: i32 = 5;

/// The value attached to a condition or action row.
///
/// Its meaning depends entirely on the row's kind: a category id, an amount, a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// The value a row holds right after its kind is picked.
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.trim().is_empty())
    }

    /// Numeric reading of the value; text is parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            FieldValue::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// JSON form of the value, keeping integral numbers integral.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Number(n) => number_to_json(*n),
            FieldValue::Text(text) => serde_json::Value::String(text.clone()),
        }
    }

    /// Inverse of [`FieldValue::to_json`]; objects, arrays and nulls have no field form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
            serde_json::Value::String(s) => Some(FieldValue::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
            _ => None,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", number_to_json(*n)),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

/// Integral floats become JSON integers so `50.0` goes out as `50`.
pub(crate) fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// One condition or action row: a backend-defined kind plus its value.
///
/// The id only keys the row in the editing UI and never leaves the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindedValue {
    pub id: String,
    pub kind: String,
    pub value: FieldValue,
}

impl KindedValue {
    pub fn new(kind: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Switch kind; the old value means nothing under the new kind.
    pub fn set_kind(&mut self, kind: impl Into<String>) {
        self.kind = kind.into();
        self.value = FieldValue::empty();
    }
}

/// A trigger criterion (rule).
pub type Condition = KindedValue;

/// A benefit granted when the condition holds (reward).
pub type Action = KindedValue;

/// When the promotion is in effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityPeriod {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ValidityPeriod {
    pub fn starting(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// The in-progress, possibly incomplete promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionDraft {
    pub name: String,
    pub description: Option<String>,
    /// Local ranking only; never transmitted.
    pub priority: Option<i32>,
    pub validity: ValidityPeriod,
    pub active: bool,
    pub rules: Vec<Condition>,
    pub rewards: Vec<Action>,
}

impl Default for PromotionDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            priority: Some(DEFAULT_PRIORITY),
            validity: ValidityPeriod::default(),
            active: false,
            rules: Vec::new(),
            rewards: Vec::new(),
        }
    }
}

impl PromotionDraft {
    /// Apply every field present in `patch`, leaving the rest untouched.
    pub fn merge(&mut self, patch: DraftPatch) {
        let DraftPatch {
            name,
            description,
            priority,
            validity,
            active,
            rules,
            rewards,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(validity) = validity {
            self.validity = validity;
        }
        if let Some(active) = active {
            self.active = active;
        }
        if let Some(rules) = rules {
            self.rules = rules;
        }
        if let Some(rewards) = rewards {
            self.rewards = rewards;
        }
    }
}

/// A partial draft. `None` leaves the field alone; nested options clear it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Option<i32>>,
    pub validity: Option<ValidityPeriod>,
    pub active: Option<bool>,
    pub rules: Option<Vec<Condition>>,
    pub rewards: Option<Vec<Action>>,
}

impl DraftPatch {
    /// The general-info step's slice.
    pub fn general(
        name: impl Into<String>,
        description: Option<String>,
        priority: Option<i32>,
        validity: ValidityPeriod,
        active: bool,
    ) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description),
            priority: Some(priority),
            validity: Some(validity),
            active: Some(active),
            ..Self::default()
        }
    }

    pub fn rules(rules: Vec<Condition>) -> Self {
        Self {
            rules: Some(rules),
            ..Self::default()
        }
    }

    pub fn rewards(rewards: Vec<Action>) -> Self {
        Self {
            rewards: Some(rewards),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_merge_is_shallow() {
        let mut draft = PromotionDraft {
            name: "Summer".to_string(),
            rules: vec![Condition::new("MIN_AMOUNT", 50)],
            ..PromotionDraft::default()
        };

        draft.merge(DraftPatch::rewards(vec![Action::new("FIXED_DISCOUNT", 5)]));

        assert_eq!(draft.name, "Summer");
        assert_eq!(draft.rules.len(), 1);
        assert_eq!(draft.rewards[0].kind, "FIXED_DISCOUNT");
    }

    #[test]
    fn test_merge_replaces_whole_lists() {
        let mut draft = PromotionDraft {
            rules: vec![
                Condition::new("MIN_AMOUNT", 50),
                Condition::new("TARGET_CATEGORY", "dairy"),
            ],
            ..PromotionDraft::default()
        };

        draft.merge(DraftPatch::rules(vec![Condition::new("MIN_AMOUNT", 10)]));

        assert_eq!(draft.rules.len(), 1);
        assert_eq!(draft.rules[0].value, FieldValue::Number(10.0));
    }

    #[test]
    fn test_merge_can_clear_optional_fields() {
        let mut draft = PromotionDraft {
            description: Some("old".to_string()),
            ..PromotionDraft::default()
        };

        draft.merge(DraftPatch {
            description: Some(None),
            priority: Some(None),
            ..DraftPatch::default()
        });

        assert_eq!(draft.description, None);
        assert_eq!(draft.priority, None);
    }

    #[test]
    fn test_general_patch_sets_step_one_fields() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let patch = DraftPatch::general("Summer", None, Some(3), ValidityPeriod::starting(start), true);

        let mut draft = PromotionDraft::default();
        draft.merge(patch);

        assert_eq!(draft.name, "Summer");
        assert_eq!(draft.priority, Some(3));
        assert_eq!(draft.validity.start, Some(start));
        assert!(draft.active);
    }

    #[test]
    fn test_set_kind_resets_value() {
        let mut row = Condition::new("MIN_AMOUNT", 50);
        row.set_kind("TARGET_CATEGORY");
        assert_eq!(row.kind, "TARGET_CATEGORY");
        assert!(row.value.is_empty());
    }

    #[test]
    fn test_field_value_numbers() {
        assert_eq!(FieldValue::from(50).to_json(), serde_json::json!(50));
        assert_eq!(FieldValue::from(12.5).to_json(), serde_json::json!(12.5));
        assert_eq!(FieldValue::from(" 40 ").as_number(), Some(40.0));
        assert_eq!(FieldValue::from("gold").as_number(), None);
        assert_eq!(FieldValue::from(7).to_string(), "7");
    }

    #[test]
    fn test_row_ids_are_unique() {
        let a = Condition::new("MIN_AMOUNT", 1);
        let b = Condition::new("MIN_AMOUNT", 1);
        assert_ne!(a.id, b.id);
    }
}
