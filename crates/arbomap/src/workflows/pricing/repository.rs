use super::catalog::ActivePriceList;
use super::domain::{
    Assessment, Intervention, InterventionId, InterventionType, InterventionTypeId,
    StoredEstimate, TreeId,
};

/// Read access to assessments plus the append used when a new snapshot is recorded.
pub trait AssessmentRepository: Send + Sync {
    /// Most recent assessment by `(assessed_on, id)`.
    fn latest_for_tree(&self, tree_id: &TreeId) -> Result<Option<Assessment>, RepositoryError>;
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError>;
}

pub trait InterventionRepository: Send + Sync {
    fn fetch(&self, id: &InterventionId) -> Result<Option<Intervention>, RepositoryError>;
    fn for_tree(&self, tree_id: &TreeId) -> Result<Vec<Intervention>, RepositoryError>;
    fn intervention_type(
        &self,
        id: &InterventionTypeId,
    ) -> Result<Option<InterventionType>, RepositoryError>;

    /// Writes only the two estimate fields, and only if the stored pair still equals `expected`.
    ///
    /// Returns [`RepositoryError::Conflict`] when another writer changed the estimate in between.
    fn update_estimate(
        &self,
        id: &InterventionId,
        expected: &StoredEstimate,
        next: StoredEstimate,
    ) -> Result<(), RepositoryError>;
}

pub trait PriceListRepository: Send + Sync {
    fn active_price_list(
        &self,
        version_code: &str,
    ) -> Result<Option<ActivePriceList>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record was modified concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
