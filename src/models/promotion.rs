//! Promotions as the service returns them.

use serde::{Deserialize, Serialize};

use super::{ActionPayload, ConditionPayload};

/// A row of `GET /promotions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub is_active: bool,
}

/// Full detail of `GET /promotions/{id}` and of create/update responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionPayload>,
}

impl Promotion {
    pub fn summary(&self) -> PromotionSummary {
        PromotionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            is_active: self.is_active,
        }
    }
}
