//! Intervention price estimation.
//!
//! The estimator combines a crown-area base price (from the active price list or a fixed
//! fallback table) with the access-obstacle and mistletoe multipliers of the tree's latest
//! assessment. The service persists the result and skips writes when nothing changed.

pub mod catalog;
pub mod context;
pub mod domain;
pub mod estimate;
pub(crate) mod normalizer;
pub mod operation;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{ActivePriceList, PriceListItem, PriceListVersion};
pub use context::AssessmentPricingContext;
pub use domain::{
    Assessment, AssessmentId, Intervention, InterventionId, InterventionStatus, InterventionType,
    InterventionTypeId, StoredEstimate, TreeId,
};
pub use estimate::{InterventionEstimate, PriceBreakdown, PriceEstimator, PriceSource};
pub use operation::{map_operation_type, MappingSource, OperationMapping, OperationType};
pub use repository::{
    AssessmentRepository, InterventionRepository, PriceListRepository, RepositoryError,
};
pub use service::{
    ApplyOutcome, PricingService, PricingServiceError, RecordedAssessment, RepricedIntervention,
};
