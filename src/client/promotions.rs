//! CRUD client for the promotions resource.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::http::{ApiClient, ClientError};
use super::notify::{Notification, Notifier, TracingNotifier};
use crate::cache::QueryCache;
use crate::models::{BackendPromotionPayload, Promotion, PromotionPatch, PromotionSummary};

pub const PROMOTIONS_PATH: &str = "/promotions";

fn promotion_path(id: &str) -> String {
    format!("{}/{}", PROMOTIONS_PATH, id)
}

/// Clears the pending flag when the submission finishes, however it finishes.
struct PendingSubmission<'a>(&'a AtomicBool);

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Client for `/promotions` with a cached list that mutations invalidate.
#[derive(Debug)]
pub struct PromotionService {
    api: ApiClient,
    list: QueryCache<Vec<PromotionSummary>>,
    notifier: Arc<dyn Notifier>,
    submitting: AtomicBool,
}

impl PromotionService {
    pub fn new(api: ApiClient) -> Self {
        Self::with_notifier(api, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            list: QueryCache::until_invalidated("promotions"),
            notifier,
            submitting: AtomicBool::new(false),
        }
    }

    /// True while a create or update is in flight; the submit control should be disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    fn begin_submission(&self) -> Result<PendingSubmission<'_>, ClientError> {
        if self.submitting.swap(true, Ordering::AcqRel) {
            tracing::debug!("submission refused: another one is pending");
            return Err(ClientError::SubmissionPending);
        }
        Ok(PendingSubmission(&self.submitting))
    }

    /// GET /promotions, served from cache until a mutation invalidates it.
    pub async fn list(&self) -> Result<Vec<PromotionSummary>, ClientError> {
        self.list
            .get_or_fetch(|| self.api.get::<Vec<PromotionSummary>>(PROMOTIONS_PATH))
            .await
    }

    /// Drop the cached list and fetch it again (the retry affordance).
    pub async fn refresh(&self) -> Result<Vec<PromotionSummary>, ClientError> {
        self.list.invalidate().await;
        self.list().await
    }

    /// GET /promotions/{id}
    pub async fn get(&self, id: &str) -> Result<Promotion, ClientError> {
        self.api.get(&promotion_path(id)).await
    }

    /// POST /promotions
    pub async fn create(&self, payload: &BackendPromotionPayload) -> Result<Promotion, ClientError> {
        let _pending = self.begin_submission()?;

        match self.api.post::<_, Promotion>(PROMOTIONS_PATH, payload).await {
            Ok(promotion) => {
                self.list.invalidate().await;
                tracing::info!(id = %promotion.id, "promotion created");
                self.notifier
                    .notify(Notification::success("Promotion created successfully"));
                Ok(promotion)
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Could not create the promotion"));
                Err(e)
            }
        }
    }

    /// PUT /promotions/{id}
    pub async fn update(&self, id: &str, patch: &PromotionPatch) -> Result<Promotion, ClientError> {
        let _pending = self.begin_submission()?;

        match self.api.put::<_, Promotion>(&promotion_path(id), patch).await {
            Ok(promotion) => {
                self.list.invalidate().await;
                tracing::info!(id, "promotion updated");
                self.notifier
                    .notify(Notification::success("Promotion updated successfully"));
                Ok(promotion)
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Could not update the promotion"));
                Err(e)
            }
        }
    }

    /// DELETE /promotions/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        match self.api.delete(&promotion_path(id)).await {
            Ok(()) => {
                self.list.invalidate().await;
                tracing::info!(id, "promotion deleted");
                self.notifier.notify(Notification::success("Promotion deleted"));
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Could not delete the promotion"));
                Err(e)
            }
        }
    }
}
