//! The four-step promotion authoring wizard.
//!
//! A [`WizardSession`] owns the draft for one authoring session. It is created per
//! invocation (fresh or seeded from an existing promotion) and consumed on successful
//! submission, so no draft outlives its session.

mod review;
mod step;
mod submit;

pub use review::*;
pub use step::*;
pub use submit::*;

use std::fmt;

use thiserror::Error;

use crate::catalog::{CatalogClient, KindsLoad};
use crate::mapper::draft_from_promotion;
use crate::models::{DraftPatch, FieldValue, KindedValue, Promotion, PromotionDraft};
use crate::validation::{self, ValidationErrors};

/// Rows per list the backend accepts; further rows would be dropped on submission.
pub const MAX_TRANSMITTED_ROWS: usize = 1;

/// Which list of rows an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Rules,
    Rewards,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Rules => f.write_str("rule"),
            Section::Rewards => f.write_str("reward"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("only one {0} can be submitted")]
    LimitReached(Section),
    #[error("no {0} with id {1}")]
    UnknownRow(Section, String),
}

/// One authoring session: current step, draft, and dirty/editing flags.
#[derive(Debug, Clone)]
pub struct WizardSession {
    step: WizardStep,
    draft: PromotionDraft,
    dirty: bool,
    editing: Option<String>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    /// A blank "create" session.
    pub fn new() -> Self {
        Self {
            step: WizardStep::FIRST,
            draft: PromotionDraft::default(),
            dirty: false,
            editing: None,
        }
    }

    /// An "edit" session seeded with an existing draft; starts clean.
    pub fn edit(id: impl Into<String>, draft: PromotionDraft) -> Self {
        Self {
            step: WizardStep::FIRST,
            draft,
            dirty: false,
            editing: Some(id.into()),
        }
    }

    /// An "edit" session for a promotion fetched from the service.
    pub fn from_promotion(promotion: &Promotion) -> Self {
        Self::edit(promotion.id.clone(), draft_from_promotion(promotion))
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &PromotionDraft {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// External id of the promotion being edited.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Shallow-merge `patch` into the draft. Does not validate.
    pub fn merge_draft(&mut self, patch: DraftPatch) {
        if patch.is_empty() {
            return;
        }
        self.draft.merge(patch);
        self.dirty = true;
    }

    /// Next step, clamped at review.
    pub fn advance(&mut self) -> WizardStep {
        self.move_to(self.step.next())
    }

    /// Previous step, clamped at general info.
    pub fn retreat(&mut self) -> WizardStep {
        self.move_to(self.step.previous())
    }

    fn move_to(&mut self, step: WizardStep) -> WizardStep {
        if step != self.step {
            tracing::debug!(from = self.step.number(), to = step.number(), "wizard step");
            self.step = step;
        }
        self.step
    }

    /// Back to a blank create session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Validate the slice of `draft` that `step` edits.
    pub fn validate_step(step: WizardStep, draft: &PromotionDraft) -> Result<(), ValidationErrors> {
        match step {
            WizardStep::GeneralInfo => validation::validate_general(draft),
            WizardStep::Rules => validation::validate_rules(&draft.rules),
            WizardStep::Rewards => validation::validate_rewards(&draft.rewards),
            WizardStep::Review => Ok(()),
        }
    }

    /// Validate the current step against the current draft.
    pub fn validate_current(&self) -> Result<(), ValidationErrors> {
        Self::validate_step(self.step, &self.draft)
    }

    /// Commit the current step's values and move forward.
    ///
    /// The values are validated together with the rest of the draft first; on failure
    /// nothing is merged and the step does not change.
    pub fn submit_step(&mut self, patch: DraftPatch) -> Result<WizardStep, ValidationErrors> {
        let mut candidate = self.draft.clone();
        candidate.merge(patch.clone());
        Self::validate_step(self.step, &candidate)?;

        self.merge_draft(patch);
        Ok(self.advance())
    }

    /// Keep the current step's values as they are and move back. Never blocked.
    pub fn go_back(&mut self, patch: DraftPatch) -> WizardStep {
        self.merge_draft(patch);
        self.retreat()
    }

    /// Check the current step's rows against the kinds the catalog offers right now.
    ///
    /// Steps without rows pass. So does an unavailable catalog, which cannot tell
    /// offered kinds from withdrawn ones.
    pub async fn check_offered_kinds(&self, catalog: &CatalogClient) -> Result<(), ValidationErrors> {
        let (section, field, load) = match self.step {
            WizardStep::Rules => (Section::Rules, "rules", catalog.condition_kinds().await),
            WizardStep::Rewards => (Section::Rewards, "rewards", catalog.action_kinds().await),
            WizardStep::GeneralInfo | WizardStep::Review => return Ok(()),
        };
        match load {
            KindsLoad::Loaded(offered) => {
                validation::validate_kinds_offered(field, self.rows(section), &offered)
            }
            KindsLoad::Unavailable { .. } => Ok(()),
        }
    }

    pub fn rows(&self, section: Section) -> &[KindedValue] {
        match section {
            Section::Rules => &self.draft.rules,
            Section::Rewards => &self.draft.rewards,
        }
    }

    fn rows_mut(&mut self, section: Section) -> &mut Vec<KindedValue> {
        match section {
            Section::Rules => &mut self.draft.rules,
            Section::Rewards => &mut self.draft.rewards,
        }
    }

    /// Whether the add control for `section` should be enabled.
    pub fn can_add_row(&self, section: Section) -> bool {
        self.rows(section).len() < MAX_TRANSMITTED_ROWS
    }

    /// Append a row of `kind` with an empty value; returns its id.
    pub fn add_row(&mut self, section: Section, kind: impl Into<String>) -> Result<String, RowError> {
        if !self.can_add_row(section) {
            return Err(RowError::LimitReached(section));
        }
        let row = KindedValue::new(kind, FieldValue::empty());
        let id = row.id.clone();
        self.rows_mut(section).push(row);
        self.dirty = true;
        Ok(id)
    }

    pub fn remove_row(&mut self, section: Section, id: &str) -> Result<(), RowError> {
        let rows = self.rows_mut(section);
        let index = rows
            .iter()
            .position(|row| row.id == id)
            .ok_or_else(|| RowError::UnknownRow(section, id.to_string()))?;
        rows.remove(index);
        self.dirty = true;
        Ok(())
    }

    /// Change a row's kind; its value is cleared.
    pub fn set_row_kind(
        &mut self,
        section: Section,
        id: &str,
        kind: impl Into<String>,
    ) -> Result<(), RowError> {
        self.row_mut(section, id)?.set_kind(kind);
        self.dirty = true;
        Ok(())
    }

    pub fn set_row_value(
        &mut self,
        section: Section,
        id: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), RowError> {
        self.row_mut(section, id)?.value = value.into();
        self.dirty = true;
        Ok(())
    }

    fn row_mut(&mut self, section: Section, id: &str) -> Result<&mut KindedValue, RowError> {
        self.rows_mut(section)
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| RowError::UnknownRow(section, id.to_string()))
    }
}
