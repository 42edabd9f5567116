//! Final submission of a wizard session.

use thiserror::Error;

use super::{WizardSession, WizardStep, ALL_STEPS};
use crate::client::{ClientError, PromotionService};
use crate::mapper::{MappingError, PayloadMapper, CONDITION_RULES};
use crate::models::{Promotion, PromotionPatch};
use crate::validation::ValidationErrors;

/// Why a submission did not go through.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("step {number} is incomplete: {errors}", number = .step.number())]
    Invalid {
        step: WizardStep,
        errors: ValidationErrors,
    },
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Service(#[from] ClientError),
}

impl SubmitError {
    /// The step the user must return to, if any. Service failures need no step change.
    pub fn offending_step(&self) -> Option<WizardStep> {
        match self {
            SubmitError::Invalid { step, .. } => Some(*step),
            SubmitError::Mapping(MappingError::MissingCondition) => Some(WizardStep::Rules),
            SubmitError::Mapping(MappingError::MissingReward) => Some(WizardStep::Rewards),
            SubmitError::Mapping(
                MappingError::MissingStartDate | MappingError::EndDateOutOfRange,
            ) => Some(WizardStep::GeneralInfo),
            SubmitError::Mapping(MappingError::NotANumber { kind, .. }) => {
                if CONDITION_RULES.iter().any(|rule| rule.kind == kind) {
                    Some(WizardStep::Rules)
                } else {
                    Some(WizardStep::Rewards)
                }
            }
            SubmitError::Service(_) => None,
        }
    }
}

/// A failed submission hands the session back so the user can retry without re-entering data.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SubmitFailure {
    pub session: WizardSession,
    #[source]
    pub error: SubmitError,
}

impl WizardSession {
    fn check_all_steps(&self) -> Result<(), SubmitError> {
        for step in ALL_STEPS {
            Self::validate_step(step, self.draft())
                .map_err(|errors| SubmitError::Invalid { step, errors })?;
        }
        Ok(())
    }

    /// Validate, map and send the draft: create for new sessions, update when editing.
    ///
    /// Consumes the session; on failure it is returned untouched inside [`SubmitFailure`].
    pub async fn submit(
        self,
        service: &PromotionService,
        mapper: &PayloadMapper,
    ) -> Result<Promotion, SubmitFailure> {
        let result = self.send(service, mapper).await;
        match result {
            Ok(promotion) => Ok(promotion),
            Err(error) => {
                tracing::warn!("submission failed: {}", error);
                Err(SubmitFailure {
                    session: self,
                    error,
                })
            }
        }
    }

    async fn send(
        &self,
        service: &PromotionService,
        mapper: &PayloadMapper,
    ) -> Result<Promotion, SubmitError> {
        self.check_all_steps()?;
        let payload = mapper.map(self.draft())?;

        let promotion = match self.editing_id() {
            Some(id) => service.update(id, &PromotionPatch::from(payload)).await?,
            None => service.create(&payload).await?,
        };
        Ok(promotion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FIXED_DISCOUNT, MIN_AMOUNT};

    #[test]
    fn test_offending_steps() {
        let step = |error: MappingError| SubmitError::Mapping(error).offending_step();

        assert_eq!(step(MappingError::MissingCondition), Some(WizardStep::Rules));
        assert_eq!(step(MappingError::MissingReward), Some(WizardStep::Rewards));
        assert_eq!(step(MappingError::MissingStartDate), Some(WizardStep::GeneralInfo));
        assert_eq!(
            step(MappingError::NotANumber {
                kind: MIN_AMOUNT.to_string(),
                value: "x".to_string()
            }),
            Some(WizardStep::Rules)
        );
        assert_eq!(
            step(MappingError::NotANumber {
                kind: FIXED_DISCOUNT.to_string(),
                value: "x".to_string()
            }),
            Some(WizardStep::Rewards)
        );
        assert_eq!(
            SubmitError::Service(ClientError::SubmissionPending).offending_step(),
            None
        );
    }

    #[test]
    fn test_out_of_range_text_never_reaches_the_mapper() {
        use crate::models::{Action, Condition, DraftPatch, ValidityPeriod};
        use chrono::{TimeZone, Utc};

        let mut session = WizardSession::new();
        session.merge_draft(DraftPatch {
            name: Some("Negative".to_string()),
            validity: Some(ValidityPeriod::starting(
                Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
            )),
            rules: Some(vec![Condition::new(MIN_AMOUNT, "-5")]),
            rewards: Some(vec![Action::new(FIXED_DISCOUNT, "0")]),
            ..DraftPatch::default()
        });

        let err = session.check_all_steps().unwrap_err();
        assert_eq!(err.offending_step(), Some(WizardStep::Rules));

        session.merge_draft(DraftPatch::rules(vec![Condition::new(MIN_AMOUNT, "5")]));
        let err = session.check_all_steps().unwrap_err();
        assert_eq!(err.offending_step(), Some(WizardStep::Rewards));
    }

    #[test]
    fn test_blank_session_fails_on_general_info() {
        let session = WizardSession::new();
        let err = session.check_all_steps().unwrap_err();
        assert_eq!(err.offending_step(), Some(WizardStep::GeneralInfo));
    }
}
