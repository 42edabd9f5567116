//! Mapping between the flat draft and the backend's nested promotion shape.
//!
//! Only the first condition and the first reward are transmitted. Each kind's value is
//! renamed into the configuration field the backend expects; kinds without a rule go
//! out as `{ "value": ... }` so kinds this client has never seen still round-trip.

use chrono::{DateTime, Months, SecondsFormat, Utc};
use thiserror::Error;

use crate::config::DEFAULT_VALIDITY_DURATION_WHEN_OPEN_ENDED;
use crate::models::{
    ActionPayload, BackendPromotionPayload, ConditionPayload, Configuration, FieldValue,
    KindedValue, Promotion, PromotionDraft, ValidityPeriod,
};
use crate::registry::{FIXED_DISCOUNT, MIN_AMOUNT, PERCENTAGE_DISCOUNT, TARGET_CATEGORY};

/// Configuration key used for kinds without a renaming rule.
pub const FALLBACK_FIELD: &str = "value";

/// A precondition for submission is not met.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("the promotion needs at least one rule")]
    MissingCondition,
    #[error("the promotion needs at least one reward")]
    MissingReward,
    #[error("the start date is required")]
    MissingStartDate,
    #[error("{kind} expects a number, got {value:?}")]
    NotANumber { kind: String, value: String },
    #[error("open-ended validity overflows the calendar")]
    EndDateOutOfRange,
}

/// How a kind's value is coerced before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Verbatim,
    Numeric,
}

/// Renames one kind's value into its backend configuration field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub kind: &'static str,
    pub field: &'static str,
    pub coercion: Coercion,
}

pub const CONDITION_RULES: &[FieldRule] = &[
    FieldRule {
        kind: TARGET_CATEGORY,
        field: "categoryId",
        coercion: Coercion::Verbatim,
    },
    FieldRule {
        kind: MIN_AMOUNT,
        field: "amount",
        coercion: Coercion::Numeric,
    },
];

pub const ACTION_RULES: &[FieldRule] = &[
    FieldRule {
        kind: PERCENTAGE_DISCOUNT,
        field: "discountPercentage",
        coercion: Coercion::Numeric,
    },
    FieldRule {
        kind: FIXED_DISCOUNT,
        field: "discountFixed",
        coercion: Coercion::Numeric,
    },
];

fn rule_for(rules: &'static [FieldRule], kind: &str) -> Option<&'static FieldRule> {
    rules.iter().find(|rule| rule.kind == kind)
}

/// Whether `kind`'s value goes out as a number.
pub fn is_numeric(rules: &'static [FieldRule], kind: &str) -> bool {
    rule_for(rules, kind).is_some_and(|rule| rule.coercion == Coercion::Numeric)
}

/// Build the configuration object for one row.
pub fn configuration_for(
    rules: &'static [FieldRule],
    row: &KindedValue,
) -> Result<Configuration, MappingError> {
    let mut configuration = Configuration::new();
    match rule_for(rules, &row.kind) {
        Some(rule) => {
            let value = match rule.coercion {
                Coercion::Verbatim => row.value.to_json(),
                Coercion::Numeric => {
                    let number = row.value.as_number().ok_or_else(|| MappingError::NotANumber {
                        kind: row.kind.clone(),
                        value: row.value.to_string(),
                    })?;
                    FieldValue::Number(number).to_json()
                }
            };
            configuration.insert(rule.field.to_string(), value);
        }
        None => {
            configuration.insert(FALLBACK_FIELD.to_string(), row.value.to_json());
        }
    }
    Ok(configuration)
}

/// Read a row's value back out of a stored configuration.
pub fn value_from_configuration(
    rules: &'static [FieldRule],
    kind: &str,
    configuration: &Configuration,
) -> FieldValue {
    let field = rule_for(rules, kind).map_or(FALLBACK_FIELD, |rule| rule.field);
    configuration
        .get(field)
        .and_then(FieldValue::from_json)
        .unwrap_or_default()
}

/// Render a timestamp the way the backend stores it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Draft to request body conversion.
#[derive(Debug, Clone, Copy)]
pub struct PayloadMapper {
    open_ended_validity: Months,
}

impl Default for PayloadMapper {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDITY_DURATION_WHEN_OPEN_ENDED)
    }
}

impl PayloadMapper {
    pub fn new(open_ended_validity: Months) -> Self {
        Self {
            open_ended_validity,
        }
    }

    /// Map using the current time for the open-ended default.
    pub fn map(&self, draft: &PromotionDraft) -> Result<BackendPromotionPayload, MappingError> {
        self.map_at(draft, Utc::now())
    }

    /// Map with an explicit "now"; an absent end date becomes `now + open_ended_validity`.
    pub fn map_at(
        &self,
        draft: &PromotionDraft,
        now: DateTime<Utc>,
    ) -> Result<BackendPromotionPayload, MappingError> {
        let rule = draft.rules.first().ok_or(MappingError::MissingCondition)?;
        let reward = draft.rewards.first().ok_or(MappingError::MissingReward)?;
        let start = draft.validity.start.ok_or(MappingError::MissingStartDate)?;

        let end = match draft.validity.end {
            Some(end) => end,
            None => now
                .checked_add_months(self.open_ended_validity)
                .ok_or(MappingError::EndDateOutOfRange)?,
        };

        let ignored = surplus_entries(draft);
        if ignored > 0 {
            tracing::debug!(ignored, "only the first rule and reward are transmitted");
        }

        Ok(BackendPromotionPayload {
            name: draft.name.clone(),
            description: draft.description.clone().unwrap_or_default(),
            start_date: format_timestamp(start),
            end_date: format_timestamp(end),
            is_active: draft.active,
            condition: ConditionPayload {
                condition_type: rule.kind.clone(),
                configuration: configuration_for(CONDITION_RULES, rule)?,
            },
            action: ActionPayload {
                action_type: reward.kind.clone(),
                configuration: configuration_for(ACTION_RULES, reward)?,
            },
        })
    }
}

/// Map with the default open-ended validity.
pub fn map_draft(draft: &PromotionDraft) -> Result<BackendPromotionPayload, MappingError> {
    PayloadMapper::default().map(draft)
}

/// Rows beyond the first rule and first reward, which are never transmitted.
pub fn surplus_entries(draft: &PromotionDraft) -> usize {
    draft.rules.len().saturating_sub(1) + draft.rewards.len().saturating_sub(1)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| tracing::warn!("unparseable timestamp {raw:?}: {e}"))
        .ok()
}

/// Seed an edit-mode draft from a stored promotion.
///
/// Priority is not stored by the backend, so it comes back unset.
pub fn draft_from_promotion(promotion: &Promotion) -> PromotionDraft {
    let rules = promotion
        .condition
        .iter()
        .map(|condition| {
            KindedValue::new(
                condition.condition_type.clone(),
                value_from_configuration(
                    CONDITION_RULES,
                    &condition.condition_type,
                    &condition.configuration,
                ),
            )
        })
        .collect();

    let rewards = promotion
        .action
        .iter()
        .map(|action| {
            KindedValue::new(
                action.action_type.clone(),
                value_from_configuration(ACTION_RULES, &action.action_type, &action.configuration),
            )
        })
        .collect();

    PromotionDraft {
        name: promotion.name.clone(),
        description: promotion.description.clone().filter(|d| !d.is_empty()),
        priority: None,
        validity: ValidityPeriod {
            start: parse_timestamp(&promotion.start_date),
            end: promotion.end_date.as_deref().and_then(parse_timestamp),
        },
        active: promotion.is_active,
        rules,
        rewards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, Condition};
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn summer_draft() -> PromotionDraft {
        PromotionDraft {
            name: "Summer".to_string(),
            validity: ValidityPeriod::starting(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            rules: vec![Condition::new(MIN_AMOUNT, 50)],
            rewards: vec![Action::new(PERCENTAGE_DISCOUNT, 10)],
            ..PromotionDraft::default()
        }
    }

    fn object(value: Value) -> Configuration {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_summer_scenario() {
        let payload = PayloadMapper::default().map_at(&summer_draft(), now()).unwrap();

        assert_eq!(payload.name, "Summer");
        assert_eq!(payload.description, "");
        assert!(!payload.is_active);
        assert_eq!(payload.start_date, "2026-01-01T00:00:00.000Z");
        assert_eq!(payload.end_date, "2027-10-19T09:30:00.000Z");
        assert_eq!(payload.condition.condition_type, MIN_AMOUNT);
        assert_eq!(payload.condition.configuration, object(json!({ "amount": 50 })));
        assert_eq!(payload.action.action_type, PERCENTAGE_DISCOUNT);
        assert_eq!(
            payload.action.configuration,
            object(json!({ "discountPercentage": 10 }))
        );
    }

    #[test]
    fn test_explicit_end_date_is_kept() {
        let mut draft = summer_draft();
        draft.validity.end = Some(Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap());

        let payload = PayloadMapper::default().map_at(&draft, now()).unwrap();
        assert_eq!(payload.end_date, "2026-03-31T23:59:59.000Z");
    }

    #[test]
    fn test_open_ended_duration_is_configurable() {
        let payload = PayloadMapper::new(Months::new(3))
            .map_at(&summer_draft(), now())
            .unwrap();
        assert_eq!(payload.end_date, "2027-01-19T09:30:00.000Z");
    }

    #[test]
    fn test_category_and_fixed_discount_renames() {
        let draft = PromotionDraft {
            rules: vec![Condition::new(TARGET_CATEGORY, "073e7bb2-fd8d-4868-aa8c-b18d2ed16538")],
            rewards: vec![Action::new(FIXED_DISCOUNT, "500")],
            ..summer_draft()
        };

        let payload = PayloadMapper::default().map_at(&draft, now()).unwrap();
        assert_eq!(
            payload.condition.configuration,
            object(json!({ "categoryId": "073e7bb2-fd8d-4868-aa8c-b18d2ed16538" }))
        );
        assert_eq!(payload.action.configuration, object(json!({ "discountFixed": 500 })));
    }

    #[test]
    fn test_unknown_kinds_fall_back_to_value() {
        let draft = PromotionDraft {
            rules: vec![Condition::new("LOYALTY_LEVEL", "gold")],
            rewards: vec![Action::new("FREE_PRODUCT", "water")],
            ..summer_draft()
        };

        let payload = PayloadMapper::default().map_at(&draft, now()).unwrap();
        assert_eq!(payload.condition.condition_type, "LOYALTY_LEVEL");
        assert_eq!(payload.condition.configuration, object(json!({ "value": "gold" })));
        assert_eq!(payload.action.configuration, object(json!({ "value": "water" })));
    }

    #[test]
    fn test_only_first_rows_are_sent() {
        let mut draft = summer_draft();
        draft.rules.push(Condition::new(TARGET_CATEGORY, "snacks"));

        let payload = PayloadMapper::default().map_at(&draft, now()).unwrap();
        assert_eq!(payload.condition.condition_type, MIN_AMOUNT);
        assert_eq!(surplus_entries(&draft), 1);

        let body = serde_json::to_string(&payload).unwrap();
        assert!(!body.contains("snacks"));
    }

    #[test]
    fn test_preconditions_in_order() {
        let empty = PromotionDraft::default();
        assert_eq!(
            PayloadMapper::default().map_at(&empty, now()),
            Err(MappingError::MissingCondition)
        );

        let no_reward = PromotionDraft {
            rewards: vec![],
            validity: ValidityPeriod::default(),
            ..summer_draft()
        };
        assert_eq!(
            PayloadMapper::default().map_at(&no_reward, now()),
            Err(MappingError::MissingReward)
        );

        let no_start = PromotionDraft {
            validity: ValidityPeriod::default(),
            ..summer_draft()
        };
        assert_eq!(
            PayloadMapper::default().map_at(&no_start, now()),
            Err(MappingError::MissingStartDate)
        );
    }

    #[test]
    fn test_numeric_kind_with_text_value_fails() {
        let draft = PromotionDraft {
            rules: vec![Condition::new(MIN_AMOUNT, "fifty")],
            ..summer_draft()
        };
        assert!(matches!(
            PayloadMapper::default().map_at(&draft, now()),
            Err(MappingError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_mapping_is_deterministic_for_a_fixed_now() {
        let draft = summer_draft();
        let mapper = PayloadMapper::default();
        assert_eq!(mapper.map_at(&draft, now()), mapper.map_at(&draft, now()));
    }

    #[test]
    fn test_draft_from_promotion_reverses_renames() {
        let promotion = Promotion {
            id: "promo-1".to_string(),
            name: "Summer".to_string(),
            description: Some(String::new()),
            start_date: "2026-01-01T00:00:00.000Z".to_string(),
            end_date: Some("2026-12-31T00:00:00.000Z".to_string()),
            is_active: true,
            condition: Some(ConditionPayload {
                condition_type: MIN_AMOUNT.to_string(),
                configuration: object(json!({ "amount": 50 })),
            }),
            action: Some(ActionPayload {
                action_type: "FREE_PRODUCT".to_string(),
                configuration: object(json!({ "value": "water" })),
            }),
        };

        let draft = draft_from_promotion(&promotion);
        assert_eq!(draft.name, "Summer");
        assert_eq!(draft.description, None);
        assert!(draft.active);
        assert_eq!(draft.validity.start, Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(draft.rules[0].kind, MIN_AMOUNT);
        assert_eq!(draft.rules[0].value, FieldValue::Number(50.0));
        assert_eq!(draft.rewards[0].value, FieldValue::Text("water".to_string()));

        let payload = PayloadMapper::default().map_at(&draft, now()).unwrap();
        assert_eq!(payload.condition, promotion.condition.unwrap());
        assert_eq!(payload.end_date, "2026-12-31T00:00:00.000Z");
    }
}
