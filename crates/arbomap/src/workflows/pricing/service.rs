use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{Assessment, Intervention, InterventionId, TreeId};
use super::estimate::{InterventionEstimate, PriceEstimator};
use super::repository::{
    AssessmentRepository, InterventionRepository, PriceListRepository, RepositoryError,
};
use crate::config::PricingConfig;

/// Whether applying an estimate changed the stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepricedIntervention {
    pub intervention_id: InterventionId,
    pub outcome: ApplyOutcome,
    pub estimated_price_czk: Option<i64>,
}

/// Result of recording an assessment. The assessment is stored even when repricing fails.
#[derive(Debug, Clone)]
pub struct RecordedAssessment {
    pub assessment: Assessment,
    pub repriced: Vec<RepricedIntervention>,
    pub repricing_error: Option<String>,
}

/// Service composing the repositories with the estimator.
pub struct PricingService<A, I, P> {
    assessments: Arc<A>,
    interventions: Arc<I>,
    price_lists: Arc<P>,
    estimator: PriceEstimator,
    price_list_version: String,
}

impl<A, I, P> PricingService<A, I, P>
where
    A: AssessmentRepository + 'static,
    I: InterventionRepository + 'static,
    P: PriceListRepository + 'static,
{
    pub fn new(
        assessments: Arc<A>,
        interventions: Arc<I>,
        price_lists: Arc<P>,
        config: &PricingConfig,
    ) -> Self {
        Self {
            assessments,
            interventions,
            price_lists,
            estimator: PriceEstimator::new(config),
            price_list_version: config.price_list_version.clone(),
        }
    }

    /// Read-only estimate for a stored intervention.
    pub fn estimate_intervention_price(
        &self,
        intervention_id: &InterventionId,
    ) -> Result<InterventionEstimate, PricingServiceError> {
        let intervention = self.load(intervention_id)?;
        self.estimate_for(&intervention)
    }

    /// Recomputes the estimate and persists it when it differs from the stored pair.
    pub fn apply_intervention_estimate(
        &self,
        intervention_id: &InterventionId,
    ) -> Result<RepricedIntervention, PricingServiceError> {
        let intervention = self.load(intervention_id)?;
        let estimate = self.estimate_for(&intervention)?;
        let current = intervention.stored_estimate();

        let unchanged = current.estimated_price_czk == estimate.estimated_price_czk
            && current.breakdown.as_ref() == Some(&estimate.breakdown);
        if unchanged {
            debug!(intervention = %intervention_id, "estimate unchanged, skipping write");
            return Ok(RepricedIntervention {
                intervention_id: intervention_id.clone(),
                outcome: ApplyOutcome::Unchanged,
                estimated_price_czk: estimate.estimated_price_czk,
            });
        }

        let estimated_price_czk = estimate.estimated_price_czk;
        self.interventions
            .update_estimate(intervention_id, &current, estimate.into())?;
        info!(
            intervention = %intervention_id,
            price = ?estimated_price_czk,
            "intervention estimate updated"
        );

        Ok(RepricedIntervention {
            intervention_id: intervention_id.clone(),
            outcome: ApplyOutcome::Updated,
            estimated_price_czk,
        })
    }

    pub fn on_intervention_saved(
        &self,
        intervention_id: &InterventionId,
    ) -> Result<RepricedIntervention, PricingServiceError> {
        self.apply_intervention_estimate(intervention_id)
    }

    /// Reprices every intervention of the tree, stopping at the first failure.
    pub fn on_assessment_saved(
        &self,
        tree_id: &TreeId,
    ) -> Result<Vec<RepricedIntervention>, PricingServiceError> {
        let interventions = self.interventions.for_tree(tree_id)?;
        debug!(tree = %tree_id, count = interventions.len(), "repricing tree interventions");

        interventions
            .iter()
            .map(|intervention| self.apply_intervention_estimate(&intervention.id))
            .collect()
    }

    /// Stores a new assessment with its derived crown area, then reprices the tree.
    pub fn record_assessment(
        &self,
        mut assessment: Assessment,
    ) -> Result<RecordedAssessment, PricingServiceError> {
        assessment.refresh_crown_area();
        let stored = self.assessments.insert(assessment)?;

        let (repriced, repricing_error) = match self.on_assessment_saved(&stored.tree_id) {
            Ok(repriced) => (repriced, None),
            Err(err) => {
                warn!(
                    tree = %stored.tree_id,
                    assessment = %stored.id,
                    error = %err,
                    "repricing after assessment save failed"
                );
                (Vec::new(), Some(err.to_string()))
            }
        };

        Ok(RecordedAssessment {
            assessment: stored,
            repriced,
            repricing_error,
        })
    }

    fn load(&self, intervention_id: &InterventionId) -> Result<Intervention, PricingServiceError> {
        self.interventions
            .fetch(intervention_id)?
            .ok_or_else(|| PricingServiceError::InterventionNotFound(intervention_id.clone()))
    }

    fn estimate_for(
        &self,
        intervention: &Intervention,
    ) -> Result<InterventionEstimate, PricingServiceError> {
        let assessment = self.assessments.latest_for_tree(&intervention.tree_id)?;
        let intervention_type = match &intervention.intervention_type_id {
            Some(type_id) => self.interventions.intervention_type(type_id)?,
            None => None,
        };
        let price_list = self.price_lists.active_price_list(&self.price_list_version)?;
        if price_list.is_none() {
            debug!(version = %self.price_list_version, "no active price list, using fallback table");
        }

        Ok(self.estimator.estimate(
            intervention_type.as_ref(),
            assessment.as_ref(),
            price_list.as_ref(),
        ))
    }
}

impl From<InterventionEstimate> for super::domain::StoredEstimate {
    fn from(estimate: InterventionEstimate) -> Self {
        Self {
            estimated_price_czk: estimate.estimated_price_czk,
            breakdown: Some(estimate.breakdown),
        }
    }
}

/// Error raised by the pricing service.
#[derive(Debug, thiserror::Error)]
pub enum PricingServiceError {
    #[error("intervention {0} not found")]
    InterventionNotFound(InterventionId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
