//! Request bodies sent to the promotion service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind-specific configuration, keyed by the backend's field names.
pub type Configuration = Map<String, Value>;

/// The single trigger condition of a promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionPayload {
    pub condition_type: String,
    #[serde(default)]
    pub configuration: Configuration,
}

/// The single reward action of a promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    pub action_type: String,
    #[serde(default)]
    pub configuration: Configuration,
}

/// Request body for creating a promotion.
///
/// Dates are ISO-8601 timestamps with millisecond precision in UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendPromotionPayload {
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
    pub condition: ConditionPayload,
    pub action: ActionPayload,
}

/// Request body for updating a promotion; absent fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionPayload>,
}

impl From<BackendPromotionPayload> for PromotionPatch {
    fn from(payload: BackendPromotionPayload) -> Self {
        Self {
            name: Some(payload.name),
            description: Some(payload.description),
            start_date: Some(payload.start_date),
            end_date: Some(payload.end_date),
            is_active: Some(payload.is_active),
            condition: Some(payload.condition),
            action: Some(payload.action),
        }
    }
}
