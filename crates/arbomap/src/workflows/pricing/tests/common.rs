use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::config::PricingConfig;
use crate::workflows::pricing::catalog::{ActivePriceList, PriceListItem, PriceListVersion};
use crate::workflows::pricing::domain::{
    latest_assessment, Assessment, AssessmentId, Intervention, InterventionId, InterventionStatus,
    InterventionType, InterventionTypeId, StoredEstimate, TreeId,
};
use crate::workflows::pricing::operation::OperationType;
use crate::workflows::pricing::repository::{
    AssessmentRepository, InterventionRepository, PriceListRepository, RepositoryError,
};
use crate::workflows::pricing::service::PricingService;

pub(super) fn tree() -> TreeId {
    TreeId("tree-17".to_string())
}

pub(super) fn assessment(id: u64, crown_area_m2: Option<f64>) -> Assessment {
    Assessment {
        id: AssessmentId(id),
        tree_id: tree(),
        assessed_on: NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date"),
        height_m: None,
        crown_width_m: None,
        crown_area_m2,
        access_obstacle_level: 0,
        mistletoe_level: None,
    }
}

pub(super) fn health_type() -> InterventionType {
    InterventionType {
        id: InterventionTypeId("type-rz".to_string()),
        code: "S-RZ".to_string(),
        name: "Zdravotní řez".to_string(),
        category: Some("řez".to_string()),
    }
}

pub(super) fn intervention(id: &str) -> Intervention {
    Intervention {
        id: InterventionId(id.to_string()),
        tree_id: tree(),
        intervention_type_id: Some(health_type().id),
        status: InterventionStatus::Proposed,
        description: "Odstranění suchých větví".to_string(),
        estimated_price_czk: None,
        estimated_price_breakdown: None,
    }
}

pub(super) fn price_item(
    code: &str,
    operation_type: OperationType,
    band: (u32, Option<u32>),
    price_czk: i64,
) -> PriceListItem {
    PriceListItem {
        item_code: code.to_string(),
        activity_code: "ZE41".to_string(),
        label: format!("{code} test item"),
        unit: "ks".to_string(),
        price_czk,
        band_min_m2: Some(band.0),
        band_max_m2: band.1,
        operation_type,
        is_combo: false,
        is_memorial_or_special: false,
    }
}

pub(super) fn noo_2026(items: Vec<PriceListItem>) -> ActivePriceList {
    ActivePriceList {
        version: PriceListVersion {
            code: "NOO_2026".to_string(),
            label: "NOO 2026".to_string(),
        },
        items,
    }
}

/// In-memory store backing all three repositories, counting estimate writes.
#[derive(Default)]
pub(super) struct MemoryStore {
    assessments: Mutex<Vec<Assessment>>,
    interventions: Mutex<HashMap<InterventionId, Intervention>>,
    types: Mutex<HashMap<InterventionTypeId, InterventionType>>,
    price_lists: Mutex<Vec<ActivePriceList>>,
    writes: Mutex<Vec<InterventionId>>,
    interleaved_write: Mutex<Option<StoredEstimate>>,
}

impl MemoryStore {
    pub(super) fn seeded() -> Arc<Self> {
        let store = Self::default();
        store.add_type(health_type());
        Arc::new(store)
    }

    pub(super) fn add_type(&self, kind: InterventionType) {
        self.types
            .lock()
            .expect("types mutex poisoned")
            .insert(kind.id.clone(), kind);
    }

    pub(super) fn add_assessment(&self, assessment: Assessment) {
        self.assessments
            .lock()
            .expect("assessment mutex poisoned")
            .push(assessment);
    }

    pub(super) fn add_intervention(&self, intervention: Intervention) {
        self.interventions
            .lock()
            .expect("intervention mutex poisoned")
            .insert(intervention.id.clone(), intervention);
    }

    pub(super) fn add_price_list(&self, price_list: ActivePriceList) {
        self.price_lists
            .lock()
            .expect("price list mutex poisoned")
            .push(price_list);
    }

    /// Another writer stores `estimate` right before the next `update_estimate` compares.
    pub(super) fn interleave_write(&self, estimate: StoredEstimate) {
        *self
            .interleaved_write
            .lock()
            .expect("interleave mutex poisoned") = Some(estimate);
    }

    pub(super) fn writes(&self) -> Vec<InterventionId> {
        self.writes.lock().expect("writes mutex poisoned").clone()
    }

    pub(super) fn stored(&self, id: &str) -> Intervention {
        self.interventions
            .lock()
            .expect("intervention mutex poisoned")
            .get(&InterventionId(id.to_string()))
            .cloned()
            .expect("intervention stored")
    }
}

impl AssessmentRepository for MemoryStore {
    fn latest_for_tree(&self, tree_id: &TreeId) -> Result<Option<Assessment>, RepositoryError> {
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(latest_assessment(guard.iter().filter(|a| &a.tree_id == tree_id)).cloned())
    }

    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        self.add_assessment(assessment.clone());
        Ok(assessment)
    }
}

impl InterventionRepository for MemoryStore {
    fn fetch(&self, id: &InterventionId) -> Result<Option<Intervention>, RepositoryError> {
        let guard = self.interventions.lock().expect("intervention mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_tree(&self, tree_id: &TreeId) -> Result<Vec<Intervention>, RepositoryError> {
        let guard = self.interventions.lock().expect("intervention mutex poisoned");
        let mut matching: Vec<Intervention> = guard
            .values()
            .filter(|intervention| &intervention.tree_id == tree_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matching)
    }

    fn intervention_type(
        &self,
        id: &InterventionTypeId,
    ) -> Result<Option<InterventionType>, RepositoryError> {
        let guard = self.types.lock().expect("types mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_estimate(
        &self,
        id: &InterventionId,
        expected: &StoredEstimate,
        next: StoredEstimate,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.interventions.lock().expect("intervention mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let interleaved = self
            .interleaved_write
            .lock()
            .expect("interleave mutex poisoned")
            .take();
        if let Some(other) = interleaved {
            record.estimated_price_czk = other.estimated_price_czk;
            record.estimated_price_breakdown = other.breakdown;
        }
        if &record.stored_estimate() != expected {
            return Err(RepositoryError::Conflict);
        }
        record.estimated_price_czk = next.estimated_price_czk;
        record.estimated_price_breakdown = next.breakdown;
        self.writes.lock().expect("writes mutex poisoned").push(id.clone());
        Ok(())
    }
}

impl PriceListRepository for MemoryStore {
    fn active_price_list(
        &self,
        version_code: &str,
    ) -> Result<Option<ActivePriceList>, RepositoryError> {
        let guard = self.price_lists.lock().expect("price list mutex poisoned");
        Ok(guard
            .iter()
            .find(|list| list.version.code == version_code)
            .cloned())
    }
}

/// Price-list repository whose backing store is unreachable.
pub(super) struct OfflinePriceLists;

impl PriceListRepository for OfflinePriceLists {
    fn active_price_list(
        &self,
        _version_code: &str,
    ) -> Result<Option<ActivePriceList>, RepositoryError> {
        Err(RepositoryError::Unavailable("price list store offline".to_string()))
    }
}

pub(super) type MemoryService = PricingService<MemoryStore, MemoryStore, MemoryStore>;

pub(super) fn service(store: &Arc<MemoryStore>) -> MemoryService {
    PricingService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        &PricingConfig::default(),
    )
}
