//! In-memory promotion store backing the mock service.

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::RwLock;

use super::errors::AppError;
use crate::models::{
    ActionPayload, BackendPromotionPayload, ConditionPayload, Configuration, Promotion,
    PromotionPatch,
};
use crate::registry::{
    CATEGORIES, FIXED_DISCOUNT, MIN_AMOUNT, PERCENTAGE_DISCOUNT, TARGET_CATEGORY,
};

pub const CUSTOMER_TAG: &str = "CUSTOMER_TAG";
pub const FREE_PRODUCT: &str = "FREE_PRODUCT";

/// Kinds the mock advertises on the metadata endpoints.
#[derive(Debug, Clone)]
pub struct KindCatalog {
    pub conditions: Vec<String>,
    pub actions: Vec<String>,
}

impl Default for KindCatalog {
    fn default() -> Self {
        Self {
            conditions: vec![
                TARGET_CATEGORY.to_string(),
                MIN_AMOUNT.to_string(),
                CUSTOMER_TAG.to_string(),
            ],
            actions: vec![
                PERCENTAGE_DISCOUNT.to_string(),
                FIXED_DISCOUNT.to_string(),
                FREE_PRODUCT.to_string(),
            ],
        }
    }
}

#[derive(Debug, Default)]
pub struct PromotionStore {
    promotions: RwLock<Vec<Promotion>>,
}

impl PromotionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with a handful of sample promotions.
    pub fn seeded() -> Self {
        Self {
            promotions: RwLock::new(sample_promotions()),
        }
    }

    pub async fn list(&self) -> Vec<Promotion> {
        self.promotions.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Promotion> {
        self.promotions
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn create(&self, request: BackendPromotionPayload) -> Result<Promotion, AppError> {
        validate_fields(
            &request.name,
            &request.start_date,
            Some(&request.end_date),
            &request.condition.condition_type,
            &request.action.action_type,
        )?;

        let promotion = Promotion {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name,
            description: Some(request.description).filter(|d| !d.is_empty()),
            start_date: request.start_date,
            end_date: Some(request.end_date),
            is_active: request.is_active,
            condition: Some(request.condition),
            action: Some(request.action),
        };

        self.promotions.write().await.push(promotion.clone());
        tracing::debug!("created promotion {}", promotion.id);
        Ok(promotion)
    }

    /// Apply the fields present in `request`; absent fields keep their stored value.
    pub async fn update(&self, id: &str, request: PromotionPatch) -> Result<Promotion, AppError> {
        let mut promotions = self.promotions.write().await;
        let existing = promotions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Promotion {} not found", id)))?;

        let mut updated = existing.clone();
        if let Some(name) = request.name {
            updated.name = name;
        }
        if let Some(description) = request.description {
            updated.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(start_date) = request.start_date {
            updated.start_date = start_date;
        }
        if request.end_date.is_some() {
            updated.end_date = request.end_date;
        }
        if let Some(is_active) = request.is_active {
            updated.is_active = is_active;
        }
        if request.condition.is_some() {
            updated.condition = request.condition;
        }
        if request.action.is_some() {
            updated.action = request.action;
        }

        validate_fields(
            &updated.name,
            &updated.start_date,
            updated.end_date.as_deref(),
            updated
                .condition
                .as_ref()
                .map_or("", |c| c.condition_type.as_str()),
            updated.action.as_ref().map_or("", |a| a.action_type.as_str()),
        )?;

        *existing = updated.clone();
        tracing::debug!("updated promotion {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut promotions = self.promotions.write().await;
        let before = promotions.len();
        promotions.retain(|p| p.id != id);

        if promotions.len() == before {
            return Err(AppError::NotFound(format!("Promotion {} not found", id)));
        }
        tracing::debug!("deleted promotion {}", id);
        Ok(())
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| AppError::Validation(format!("{} must be an ISO-8601 timestamp", field)))
}

fn validate_fields(
    name: &str,
    start_date: &str,
    end_date: Option<&str>,
    condition_type: &str,
    action_type: &str,
) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    let start = parse_timestamp("startDate", start_date)?;
    if let Some(end_date) = end_date {
        let end = parse_timestamp("endDate", end_date)?;
        if end <= start {
            return Err(AppError::Validation(
                "endDate must be after startDate".to_string(),
            ));
        }
    }
    if condition_type.trim().is_empty() {
        return Err(AppError::Validation("condition is required".to_string()));
    }
    if action_type.trim().is_empty() {
        return Err(AppError::Validation("action is required".to_string()));
    }
    Ok(())
}

fn configuration(value: serde_json::Value) -> Configuration {
    value.as_object().cloned().unwrap_or_default()
}

fn sample(
    id: &str,
    name: &str,
    description: &str,
    (start_date, end_date): (&str, Option<&str>),
    is_active: bool,
    condition: (&str, serde_json::Value),
    action: (&str, serde_json::Value),
) -> Promotion {
    Promotion {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        start_date: start_date.to_string(),
        end_date: end_date.map(str::to_string),
        is_active,
        condition: Some(ConditionPayload {
            condition_type: condition.0.to_string(),
            configuration: configuration(condition.1),
        }),
        action: Some(ActionPayload {
            action_type: action.0.to_string(),
            configuration: configuration(action.1),
        }),
    }
}

fn sample_promotions() -> Vec<Promotion> {
    let dairy = CATEGORIES[0].value;
    let snacks = CATEGORIES[2].value;

    vec![
        sample(
            "promo-1",
            "Dairy VIP discount",
            "Special discount on dairy products for VIP customers",
            ("2026-01-15T00:00:00.000Z", Some("2026-02-15T00:00:00.000Z")),
            true,
            (TARGET_CATEGORY, json!({ "categoryId": dairy })),
            (PERCENTAGE_DISCOUNT, json!({ "discountPercentage": 15 })),
        ),
        sample(
            "promo-2",
            "Minimum purchase $100",
            "Fixed discount on purchases over $100",
            ("2026-01-01T00:00:00.000Z", Some("2026-01-31T00:00:00.000Z")),
            true,
            (MIN_AMOUNT, json!({ "amount": 100 })),
            (FIXED_DISCOUNT, json!({ "discountFixed": 10 })),
        ),
        sample(
            "promo-3",
            "Free drink",
            "Free water with snack purchases for frequent customers",
            ("2026-02-01T00:00:00.000Z", Some("2026-03-01T00:00:00.000Z")),
            false,
            (TARGET_CATEGORY, json!({ "categoryId": snacks })),
            (FREE_PRODUCT, json!({ "value": "water" })),
        ),
        sample(
            "promo-4",
            "Wholesale premium",
            "25% off for wholesale customers",
            ("2026-01-20T00:00:00.000Z", Some("2026-04-20T00:00:00.000Z")),
            true,
            (CUSTOMER_TAG, json!({ "value": "wholesale" })),
            (PERCENTAGE_DISCOUNT, json!({ "discountPercentage": 25 })),
        ),
        sample(
            "promo-5",
            "New customers",
            "Free chocolate on a first purchase over $50",
            ("2026-01-10T00:00:00.000Z", None),
            false,
            (MIN_AMOUNT, json!({ "amount": 50 })),
            (FREE_PRODUCT, json!({ "value": "chocolate" })),
        ),
    ]
}
