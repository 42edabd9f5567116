//! Metadata catalog client: which condition and action kinds the backend offers.
//!
//! Both lists are cached for the configured freshness window (one hour by default).
//! A failed fetch degrades to an empty option list for the dependent step.

use std::time::Duration;

use crate::cache::QueryCache;
use crate::client::{ApiClient, ClientError};

pub const CONDITION_KINDS_PATH: &str = "/promotions/metadata/conditions";
pub const ACTION_KINDS_PATH: &str = "/promotions/metadata/actions";

/// Kinds for one picker, or the reason there are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindsLoad {
    Loaded(Vec<String>),
    Unavailable { reason: String },
}

impl KindsLoad {
    /// Offered kinds; empty when the catalog could not be loaded.
    pub fn kinds(&self) -> &[String] {
        match self {
            KindsLoad::Loaded(kinds) => kinds,
            KindsLoad::Unavailable { .. } => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, KindsLoad::Unavailable { .. })
    }

    fn from_result(family: &str, result: Result<Vec<String>, ClientError>) -> Self {
        match result {
            Ok(kinds) => KindsLoad::Loaded(kinds),
            Err(e) => {
                tracing::warn!("{} kinds unavailable: {}", family, e);
                KindsLoad::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct CatalogClient {
    api: ApiClient,
    conditions: QueryCache<Vec<String>>,
    actions: QueryCache<Vec<String>>,
}

impl CatalogClient {
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        Self {
            api,
            conditions: QueryCache::with_ttl("metadata.conditions", ttl),
            actions: QueryCache::with_ttl("metadata.actions", ttl),
        }
    }

    /// GET /promotions/metadata/conditions
    pub async fn fetch_condition_kinds(&self) -> Result<Vec<String>, ClientError> {
        self.conditions
            .get_or_fetch(|| self.api.get::<Vec<String>>(CONDITION_KINDS_PATH))
            .await
    }

    /// GET /promotions/metadata/actions
    pub async fn fetch_action_kinds(&self) -> Result<Vec<String>, ClientError> {
        self.actions
            .get_or_fetch(|| self.api.get::<Vec<String>>(ACTION_KINDS_PATH))
            .await
    }

    /// Condition kinds for the rules step, degraded to empty on failure.
    pub async fn condition_kinds(&self) -> KindsLoad {
        KindsLoad::from_result("condition", self.fetch_condition_kinds().await)
    }

    /// Action kinds for the rewards step, degraded to empty on failure.
    pub async fn action_kinds(&self) -> KindsLoad {
        KindsLoad::from_result("action", self.fetch_action_kinds().await)
    }
}
